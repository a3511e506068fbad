// src/report/mod.rs
// =============================================================================
// Report rendering: turns completed link sets into a downloadable tabular
// document. Purely presentational - no business logic lives here.
// =============================================================================

use crate::models::LinkSet;

const URL_COLUMN: usize = 50;

/// Render the status report for the given link sets as document bytes.
pub fn render(link_sets: &[LinkSet]) -> Vec<u8> {
    let mut out = String::new();

    out.push_str("Link Status Report\n");
    out.push_str(&"=".repeat(78));
    out.push('\n');
    out.push_str(&format!(
        "{:<8} {:<52} {:<15}\n",
        "SET ID", "URL", "STATUS"
    ));
    out.push_str(&"-".repeat(78));
    out.push('\n');

    let mut total_links = 0;
    for set in link_sets {
        for link in &set.links {
            total_links += 1;
            out.push_str(&format!(
                "{:<8} {:<52} {:<15}\n",
                set.id,
                truncate_url(&link.url),
                link.status.as_str()
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "Link sets: {}   Links: {}\n",
        link_sets.len(),
        total_links
    ));

    out.into_bytes()
}

// Long URLs are cut to the column width with a trailing ellipsis. Counted
// in characters, not bytes, so multi-byte URLs never split mid-character.
fn truncate_url(url: &str) -> String {
    if url.chars().count() <= URL_COLUMN {
        url.to_string()
    } else {
        let head: String = url.chars().take(URL_COLUMN - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkEntry, LinkState};

    fn set(id: u64, links: Vec<(&str, LinkState)>) -> LinkSet {
        LinkSet {
            id,
            links: links
                .into_iter()
                .map(|(url, status)| LinkEntry {
                    url: url.to_string(),
                    status,
                })
                .collect(),
            checked: true,
        }
    }

    #[test]
    fn renders_one_row_per_link() {
        let sets = vec![
            set(1, vec![("up.com", LinkState::Available)]),
            set(
                2,
                vec![
                    ("down.com", LinkState::NotAvailable),
                    ("later.com", LinkState::Pending),
                ],
            ),
        ];

        let text = String::from_utf8(render(&sets)).unwrap();

        assert!(text.contains("up.com"));
        assert!(text.contains("available"));
        assert!(text.contains("not_available"));
        assert!(text.contains("Link sets: 2   Links: 3"));
    }

    #[test]
    fn truncates_long_urls_with_ellipsis() {
        let long = format!("https://example.com/{}", "a".repeat(80));
        let sets = vec![set(1, vec![(long.as_str(), LinkState::Available)])];

        let text = String::from_utf8(render(&sets)).unwrap();

        let truncated = truncate_url(&long);
        assert_eq!(truncated.chars().count(), URL_COLUMN);
        assert!(truncated.ends_with("..."));
        assert!(text.contains(&truncated));
        assert!(!text.contains(&long));
    }

    #[test]
    fn short_urls_are_left_alone() {
        assert_eq!(truncate_url("https://a.com"), "https://a.com");
    }
}
