use crate::mining::{AssociationRule, FrequentItemset};
use crate::table::DataTable;

// Home page shows at most this many rows of the uploaded table
const PREVIEW_ROWS: usize = 100;

/// Render a data table as an HTML `<table>`
pub fn data_table(table: &DataTable) -> String {
    html_table(
        &table.columns.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
        table
            .rows
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect()),
    )
}

/// Render the frequent itemsets with a synthetic 1-based row-number column
pub fn itemset_table(itemsets: &[FrequentItemset]) -> String {
    html_table(
        &["", "support", "itemsets"],
        itemsets.iter().enumerate().map(|(i, set)| {
            vec![
                (i + 1).to_string(),
                metric(set.support),
                set.items.join(", "),
            ]
        }),
    )
}

/// Render the association rules with a synthetic 1-based row-number column
///
/// Leverage and conviction are computed by the miner but not displayed.
pub fn rule_table(rules: &[AssociationRule]) -> String {
    html_table(
        &[
            "",
            "antecedents",
            "consequents",
            "antecedent support",
            "consequent support",
            "support",
            "confidence",
            "lift",
        ],
        rules.iter().enumerate().map(|(i, rule)| {
            vec![
                (i + 1).to_string(),
                rule.antecedent.join(", "),
                rule.consequent.join(", "),
                metric(rule.antecedent_support),
                metric(rule.consequent_support),
                metric(rule.support),
                metric(rule.confidence),
                metric(rule.lift),
            ]
        }),
    )
}

/// Assemble the home page
///
/// Shows the upload form plus, when the caller's session has a dataset, the
/// first 100 rows of the table and the full itemset and rule tables.
///
/// # Arguments
/// * `table` - The session's parsed table, if any
/// * `itemsets` - The session's mined itemsets
/// * `rules` - The session's mined rules
/// * `error` - A user-facing error message to show above the form
pub fn home_page(
    table: Option<&DataTable>,
    itemsets: &[FrequentItemset],
    rules: &[AssociationRule],
    error: Option<&str>,
) -> String {
    let template = include_str!("./static/home.html");

    let banner = match error {
        Some(msg) => format!("<p class=\"error\">{}</p>", escape_html(msg)),
        None => String::new(),
    };

    let (preview, itemset_html, rule_html) = match table {
        Some(table) => (
            data_table(&table.head(PREVIEW_ROWS)),
            itemset_table(itemsets),
            rule_table(rules),
        ),
        None => {
            let empty = "<p class=\"empty\">No dataset loaded yet.</p>".to_string();
            (empty.clone(), empty.clone(), empty)
        }
    };

    template
        .replace("{{ERROR}}", &banner)
        .replace("{{TABLE}}", &preview)
        .replace("{{ITEMSETS}}", &itemset_html)
        .replace("{{RULES}}", &rule_html)
}

/// Assemble the dataset page showing the full stored table
pub fn dataset_page(table: &DataTable, file_name: &str) -> String {
    include_str!("./static/dataset.html")
        .replace("{{FILE_NAME}}", &escape_html(file_name))
        .replace("{{TABLE}}", &data_table(table))
}

fn html_table<I>(headers: &[&str], rows: I) -> String
where
    I: Iterator<Item = Vec<String>>,
{
    let mut out = String::from("<table>\n<thead><tr>");
    for header in headers {
        out.push_str("<th>");
        out.push_str(&escape_html(header));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str("<td>");
            out.push_str(&escape_html(&cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</tbody>\n</table>");
    out
}

fn metric(value: f64) -> String {
    format!("{:.6}", value)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn itemset_rows_are_numbered_from_one() {
        let itemsets = vec![
            FrequentItemset {
                items: vec!["BUNTING".to_string()],
                support: 0.5,
            },
            FrequentItemset {
                items: vec!["BUNTING".to_string(), "HEART".to_string()],
                support: 0.25,
            },
        ];
        let html = itemset_table(&itemsets);
        assert!(html.contains("<td>1</td><td>0.500000</td><td>BUNTING</td>"));
        assert!(html.contains("<td>2</td><td>0.250000</td><td>BUNTING, HEART</td>"));
    }

    #[test]
    fn rule_table_drops_leverage_and_conviction() {
        let rules = vec![AssociationRule {
            antecedent: vec!["BUNTING".to_string()],
            consequent: vec!["HEART".to_string()],
            antecedent_support: 0.75,
            consequent_support: 0.5,
            support: 0.5,
            confidence: 2.0 / 3.0,
            lift: 4.0 / 3.0,
            leverage: 0.125,
            conviction: Some(1.5),
        }];
        let html = rule_table(&rules);
        assert!(html.contains("<th>confidence</th>"));
        assert!(html.contains("<th>lift</th>"));
        assert!(!html.contains("leverage"));
        assert!(!html.contains("conviction"));
        assert!(html.contains("<td>1</td><td>BUNTING</td><td>HEART</td>"));
    }

    #[test]
    fn cell_text_is_escaped() {
        let mut table = DataTable::new(vec!["Description".to_string()]);
        table.push_row(vec!["<script>alert(1)</script>".to_string()]);
        let html = data_table(&table);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn home_page_without_a_session_says_nothing_loaded() {
        let html = home_page(None, &[], &[], None);
        assert!(html.contains("No dataset loaded yet."));
        assert!(html.contains("enctype=\"multipart/form-data\""));
    }

    #[test]
    fn home_page_shows_at_most_100_rows() {
        let mut table = DataTable::new(vec!["InvoiceNo".to_string()]);
        for i in 0..150 {
            table.push_row(vec![format!("54{:04}", i)]);
        }
        let html = home_page(Some(&table), &[], &[], None);
        assert!(html.contains("540099"));
        assert!(!html.contains("540100"));
    }

    #[test]
    fn error_banner_is_rendered_and_escaped() {
        let html = home_page(None, &[], &[], Some("missing column <Quantity>"));
        assert!(html.contains("class=\"error\""));
        assert!(html.contains("missing column &lt;Quantity&gt;"));
    }

    #[test]
    fn dataset_page_shows_the_filename() {
        let mut table = DataTable::new(vec!["InvoiceNo".to_string()]);
        table.push_row(vec!["536365".to_string()]);
        let html = dataset_page(&table, "basket.csv");
        assert!(html.contains("basket.csv"));
        assert!(html.contains("<td>536365</td>"));
    }
}
