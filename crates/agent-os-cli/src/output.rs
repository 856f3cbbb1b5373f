use agent_os_core::pipeline::PipelineResult;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Left-aligned columns, two spaces apart, sized to the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let separator: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    let mut lines = vec![render_row(headers, &widths), render_row(&separator, &widths)];
    lines.extend(rows.iter().map(|row| render_row(row, &widths)));
    lines.join("\n")
}

fn render_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{:w$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn summary_rows(result: &PipelineResult) -> Vec<Vec<String>> {
    result
        .records
        .iter()
        .map(|r| {
            let status = match r.failure {
                None => "ok".to_string(),
                Some(kind) => format!("failed ({kind})"),
            };
            vec![r.step.to_string(), status, r.message.clone()]
        })
        .collect()
}

/// End-of-run summary, as a table or a JSON document.
pub fn print_summary(result: &PipelineResult, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(result);
    }
    println!();
    println!(
        "{}",
        render_table(&["STEP", "STATUS", "DETAIL"], &summary_rows(result))
    );
    Ok(())
}
