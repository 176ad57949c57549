//! Column slugs: stable, URL-safe parameter keys derived from column labels
//!
//! HC uploads carry arbitrary column sets, so filter parameters cannot be
//! hardcoded per column. Each label is slugified once per view and collisions
//! are disambiguated in first-seen order.

/// Replace the Latin-1/Portuguese diacritics that show up in the source
/// spreadsheets with their ASCII base characters.
pub fn fold_diacritics(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'Á' | 'À' | 'Ã' | 'Â' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'o',
            'Ó' | 'Ò' | 'Õ' | 'Ô' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' => 'c',
            'Ç' => 'C',
            'ñ' => 'n',
            'Ñ' => 'N',
            other => other,
        })
        .collect()
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Slugify a column label: diacritics folded, lower-cased, every run of
/// non-alphanumerics collapsed to a single underscore, trimmed. Labels with
/// no usable characters fall back to `col`.
pub fn slugify(label: &str) -> String {
    let folded = fold_diacritics(label).to_lowercase();
    let mut out = String::with_capacity(folded.len());
    let mut last_sep = true;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { "col".to_string() } else { out }
}

/// A display label paired with its collision-free slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub label: String,
    pub slug: String,
}

/// Build column descriptors for a set of labels. The first occurrence of a
/// slug keeps it bare; later collisions get `_2`, `_3`, ... in first-seen
/// order.
pub fn build_columns(labels: &[String]) -> Vec<ColumnSpec> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    labels
        .iter()
        .map(|label| {
            let base = slugify(label);
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            let slug = if *n == 1 { base } else { format!("{}_{}", base, n) };
            ColumnSpec {
                label: label.clone(),
                slug,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_fold_diacritics_and_collapse_punctuation() {
        assert_eq!(slugify("Matrícula"), "matricula");
        assert_eq!(slugify("Execução  Voz"), "execucao_voz");
        assert_eq!(slugify("  Data / Hora  "), "data_hora");
        assert_eq!(slugify("%%%"), "col");
    }

    #[test]
    fn collisions_get_numeric_suffixes_in_first_seen_order() {
        let labels: Vec<String> = ["Turno", "turno", "TURNO!", "Setor"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let specs = build_columns(&labels);
        let slugs: Vec<&str> = specs.iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["turno", "turno_2", "turno_3", "setor"]);
    }
}
