//! Plain-text rendering of a material list and its cost breakdown.

use crate::{
    models::material::MaterialItem,
    pricing::{CostBreakdown, LABOR_PERCENT, TRANSPORTATION_PERCENT},
};

/// Format whole Birr as currency, e.g. `ETB 2,500.00`
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("ETB {}.00", grouped)
}

/// Labelled lines of a breakdown, in display order
pub fn breakdown_lines(breakdown: &CostBreakdown) -> [(String, u64); 3] {
    [
        ("Materials Subtotal".to_string(), breakdown.materials_subtotal),
        (
            format!("Transportation Fee ({}%)", TRANSPORTATION_PERCENT),
            breakdown.transportation_fee,
        ),
        (format!("Labor Fee ({}%)", LABOR_PERCENT), breakdown.labor_fee),
    ]
}

/// Render the items and breakdown as an aligned text table
pub fn render_text(items: &[MaterialItem], breakdown: &CostBreakdown) -> String {
    let mut rows: Vec<(String, String)> = items
        .iter()
        .map(|item| (item.name.clone(), format_currency(item.price)))
        .collect();
    let summary: Vec<(String, String)> = breakdown_lines(breakdown)
        .into_iter()
        .map(|(label, amount)| (label, format_currency(amount)))
        .collect();
    let total = ("Total Price".to_string(), format_currency(breakdown.total));

    rows.extend(summary.iter().cloned());
    rows.push(total.clone());
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let amount_width = rows.iter().map(|(_, a)| a.len()).max().unwrap_or(0);
    let rule = "-".repeat(label_width + amount_width + 2);

    let row = |label: &str, amount: &str| {
        format!("{}  {:>w$}\n", pad(label, label_width), amount, w = amount_width)
    };

    let mut out = String::from("Materials Analysis\n");
    out.push_str(&rule);
    out.push('\n');
    if items.is_empty() {
        out.push_str("(no materials recognized)\n");
    }
    for item in items {
        out.push_str(&row(&item.name, &format_currency(item.price)));
    }
    out.push_str(&rule);
    out.push('\n');
    for (label, amount) in &summary {
        out.push_str(&row(label, amount));
    }
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&row(&total.0, &total.1));
    out
}

/// Left-align by character count; `{:<w$}` would count bytes for non-ASCII names
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::compute_breakdown;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "ETB 0.00");
        assert_eq!(format_currency(300), "ETB 300.00");
        assert_eq!(format_currency(2500), "ETB 2,500.00");
        assert_eq!(format_currency(1234567), "ETB 1,234,567.00");
    }

    #[test]
    fn test_breakdown_labels() {
        let lines = breakdown_lines(&CostBreakdown::default());
        assert_eq!(lines[1].0, "Transportation Fee (10%)");
        assert_eq!(lines[2].0, "Labor Fee (15%)");
    }

    #[test]
    fn test_render_text() {
        let items = vec![MaterialItem::new("Tablecloths", 300).unwrap()];
        let text = render_text(&items, &compute_breakdown(&items));

        assert!(text.starts_with("Materials Analysis\n"));
        assert!(text.contains("Tablecloths"));
        assert!(text.contains("ETB 30.00"));
        assert!(text.contains("ETB 45.00"));
        let last = text.lines().last().unwrap();
        assert!(last.starts_with("Total Price"));
        assert!(last.ends_with("ETB 375.00"));
    }

    #[test]
    fn test_render_text_rows_are_aligned() {
        let items = vec![
            MaterialItem::new("Chairs", 500).unwrap(),
            MaterialItem::new("ሰላም", 2500).unwrap(),
        ];
        let text = render_text(&items, &compute_breakdown(&items));

        let widths: Vec<usize> = text
            .lines()
            .skip(1)
            .filter(|line| !line.starts_with('-'))
            .map(|line| line.chars().count())
            .collect();
        assert_eq!(widths.len(), 6);
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(text.contains("ሰላም"));
    }

    #[test]
    fn test_render_text_without_items() {
        let text = render_text(&[], &CostBreakdown::default());
        assert_eq!(text.lines().nth(2), Some("(no materials recognized)"));
        assert!(text.lines().last().unwrap().ends_with("ETB 0.00"));
    }

    #[test]
    fn test_render_text_empty() {
        let text = render_text(&[], &CostBreakdown::default());
        assert!(text.contains("(no materials recognized)"));
        assert!(text.lines().last().unwrap().ends_with("ETB 0.00"));
    }
}
