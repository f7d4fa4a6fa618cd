//! CSV export of a user's transactions.

use axum::{
    Extension,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use csv::{QuoteStyle, WriterBuilder};
use engine::{AuthUser, ExportRow};

use crate::{ServerError, server::ServerState, views};

const HEADER: &str = "Date,Type,Category,Amount,Note";

/// Encodes one field with the csv writer, quoting it according to `style`.
/// Empty values always render as nothing.
fn encode_field(value: &str, style: QuoteStyle) -> Result<String, ServerError> {
    let internal = |err: String| ServerError::Internal(format!("csv export: {err}"));
    if value.is_empty() {
        return Ok(String::new());
    }

    let mut writer = WriterBuilder::new().quote_style(style).from_writer(Vec::new());
    writer
        .write_field(value)
        .map_err(|err| internal(err.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|err| internal(err.into_error().to_string()))?;
    String::from_utf8(bytes).map_err(|err| internal(err.to_string()))
}

/// Renders `rows` as CSV: `\n` separated lines, no trailing newline.
///
/// Categories are quoted only when they need it. A present note is always
/// quoted with inner quotes doubled, an absent one leaves the column empty.
fn render_csv(rows: &[ExportRow]) -> Result<String, ServerError> {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(HEADER.to_string());
    for row in rows {
        let category = encode_field(
            row.category.as_deref().unwrap_or_default(),
            QuoteStyle::Necessary,
        )?;
        let note = encode_field(row.note.as_deref().unwrap_or_default(), QuoteStyle::Always)?;
        lines.push(format!(
            "{},{},{category},{},{note}",
            row.date.format("%Y-%m-%d"),
            row.kind.as_str(),
            row.amount,
        ));
    }
    Ok(lines.join("\n"))
}

/// Handle requests for downloading every transaction as CSV
pub async fn csv(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Response, ServerError> {
    let rows = state.engine.export_rows(user.id).await?;
    let body = render_csv(&rows)?;
    let disposition = format!(
        "attachment; filename=\"centa-transactions-{}.csv\"",
        views::today().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use engine::{Money, TransactionKind};

    fn row(kind: TransactionKind, category: Option<&str>, minor: i64, note: Option<&str>) -> ExportRow {
        ExportRow {
            date: NaiveDate::from_ymd_opt(2026, 3, 5).unwrap(),
            kind,
            category: category.map(str::to_string),
            amount: Money::new(minor),
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn empty_export_is_only_the_header() {
        assert_eq!(render_csv(&[]).ok().unwrap(), "Date,Type,Category,Amount,Note");
    }

    #[test]
    fn rows_use_plain_decimals_and_blank_optionals() {
        let csv = render_csv(&[
            row(TransactionKind::Expense, Some("Needs"), 12_050, Some("groceries")),
            row(TransactionKind::Income, None, 5_000_000, None),
        ])
        .ok()
        .unwrap();

        assert_eq!(
            csv,
            "Date,Type,Category,Amount,Note\n\
             2026-03-05,EXPENSE,Needs,120.50,\"groceries\"\n\
             2026-03-05,INCOME,,50000.00,"
        );
    }

    #[test]
    fn notes_with_quotes_and_commas_are_escaped() {
        let csv = render_csv(&[row(
            TransactionKind::Savings,
            Some("Savings"),
            100,
            Some("say \"hi\", then leave"),
        )])
        .ok()
        .unwrap();

        assert!(csv.ends_with("2026-03-05,SAVINGS,Savings,1.00,\"say \"\"hi\"\", then leave\""));
    }

    #[test]
    fn plain_notes_are_quoted_and_categories_only_when_needed() {
        let csv = render_csv(&[
            row(TransactionKind::Expense, Some("Food"), 45_000, Some("Lunch")),
            row(TransactionKind::Expense, Some("Rent, utilities"), 100, Some("")),
        ])
        .ok()
        .unwrap();

        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[1], "2026-03-05,EXPENSE,Food,450.00,\"Lunch\"");
        assert_eq!(lines[2], "2026-03-05,EXPENSE,\"Rent, utilities\",1.00,");
    }
}
