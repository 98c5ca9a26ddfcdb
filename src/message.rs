use crate::analysis::{BucketPair, FloorItem, FloorReport};
use crate::models::{Listing, Restriction, NAME_MARKER};
use crate::pricing::format_ton;

const UNRESTRICTED_HEADER: &str = "<b>[888] 地板价</b>";
const RESTRICTED_HEADER: &str = "<b>[888] 地板价~受限</b>";
const SECTION_SEPARATOR: &str = "=======================";
const WITH_MARKER_LABEL: &str = "<b>[含4]</b>";
const WITHOUT_MARKER_LABEL: &str = "<b>[无4]</b>";

/// Renders floor reports as Telegram HTML.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    collection_page: String,
}

impl MessageFormatter {
    /// `collection_page` is the collection URL that listing addresses are appended to.
    pub fn new(collection_page_base: &str, collection_address: &str) -> Self {
        Self {
            collection_page: format!(
                "{}{}/",
                ensure_trailing_slash(collection_page_base),
                collection_address
            ),
        }
    }

    pub fn purchase_link(&self, listing: &Listing) -> String {
        format!("{}{}", self.collection_page, listing.address)
    }

    pub fn render(&self, report: &FloorReport<'_>) -> String {
        let mut text = String::new();

        text.push_str(UNRESTRICTED_HEADER);
        text.push('\n');
        self.push_section(&mut text, report.pair(Restriction::Unrestricted));

        text.push_str(SECTION_SEPARATOR);
        text.push('\n');

        text.push_str(RESTRICTED_HEADER);
        text.push('\n');
        self.push_section(&mut text, report.pair(Restriction::Restricted));

        text
    }

    fn push_section(&self, text: &mut String, pair: &BucketPair<'_>) {
        if let Some(item) = pair.with_marker {
            self.push_line(text, WITH_MARKER_LABEL, item);
        }
        if let Some(item) = pair.without_marker {
            self.push_line(text, WITHOUT_MARKER_LABEL, item);
        }
    }

    fn push_line(&self, text: &mut String, label: &str, item: FloorItem<'_>) {
        text.push_str(&format!(
            "{}  <a href=\"{}\">{}</a> 💎<b>{}</b>\n",
            label,
            escape_html(&self.purchase_link(item.listing)),
            emphasize_marker(&item.listing.name),
            format_ton(item.price)
        ));
    }
}

fn ensure_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    }
}

/// Underline every marker occurrence in an (escaped) NFT name.
pub fn emphasize_marker(name: &str) -> String {
    escape_html(name).replace(NAME_MARKER, &format!("<ins>{}</ins>", NAME_MARKER))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
