// src/report/mod.rs
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::types::{HolderRecord, SharedAssetRow};
use rand::seq::SliceRandom;
use std::path::Path;

/// Parse a token-holder export in the explorer's CSV format: a header line,
/// then `HolderAddress,Quantity[,...]` rows, fields optionally quoted.
pub fn load_holder_export(path: &Path) -> AnalyzerResult<Vec<HolderRecord>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AnalyzerError::HolderExport(format!("{}: {}", path.display(), e)))?;

    let mut holders = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line_no == 0 || line.trim().is_empty() {
            continue;
        }
        let fields = split_csv_line(line);
        if fields.len() < 2 {
            return Err(AnalyzerError::HolderExport(format!(
                "line {}: expected address and quantity",
                line_no + 1
            )));
        }
        let quantity: f64 = fields[1].trim().parse().map_err(|_| {
            AnalyzerError::HolderExport(format!("line {}: bad quantity {:?}", line_no + 1, fields[1]))
        })?;
        holders.push(HolderRecord { address: fields[0].clone(), quantity });
    }

    if holders.is_empty() {
        return Err(AnalyzerError::HolderExport(format!(
            "{}: no holder rows",
            path.display()
        )));
    }

    log::info!("Loaded {} holders from {}", holders.len(), path.display());
    Ok(holders)
}

/// Draw a random sample of `sample_size` holders. A smaller export is used
/// whole.
pub fn sample_holders(holders: &[HolderRecord], sample_size: usize) -> Vec<HolderRecord> {
    let mut rng = rand::thread_rng();
    holders.choose_multiple(&mut rng, sample_size).cloned().collect()
}

/// Write the shared-asset report: one row per asset held by at least two
/// sampled wallets, owning addresses comma-joined.
pub fn write_shared_asset_report(path: &Path, rows: &[SharedAssetRow]) -> AnalyzerResult<()> {
    let mut content = String::from("NFT Name,Wallet Addresses\n");
    for row in rows {
        content.push_str(&csv_field(&row.asset_name));
        content.push(',');
        content.push_str(&csv_field(&row.owners.join(", ")));
        content.push('\n');
    }

    std::fs::write(path, content)
        .map_err(|e| AnalyzerError::ReportWrite(format!("{}: {}", path.display(), e)))?;

    log::info!("Wrote {} shared assets to {}", rows.len(), path.display());
    Ok(())
}

fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
