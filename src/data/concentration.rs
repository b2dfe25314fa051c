use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Label scanning: "<number> mm" anywhere in a file label
// ---------------------------------------------------------------------------

/// Extract a millimolar concentration from a label such as `sample_10mm` or
/// `CV 2.5 mM run3`.
///
/// Matches the leftmost `digits[.digits]` followed by optional whitespace and
/// `mm` (case-insensitive). Only ASCII `0-9` count as digits; full-width or
/// other script digits such as `１０mm` give `None`.
pub fn extract_concentration(label: &str) -> Option<f64> {
    let chars: Vec<char> = label.to_lowercase().chars().collect();

    for start in 0..chars.len() {
        if !chars[start].is_ascii_digit() {
            continue;
        }
        let int_end = digits_end(&chars, start);

        // Greedy fraction first, then the bare integer part.
        if chars.get(int_end) == Some(&'.') {
            let frac_end = digits_end(&chars, int_end + 1);
            if frac_end > int_end + 1 && unit_follows(&chars, frac_end) {
                return number(&chars[start..frac_end]);
            }
        }
        if unit_follows(&chars, int_end) {
            return number(&chars[start..int_end]);
        }
    }
    None
}

fn digits_end(chars: &[char], from: usize) -> usize {
    from + chars[from..].iter().take_while(|c| c.is_ascii_digit()).count()
}

fn unit_follows(chars: &[char], from: usize) -> bool {
    let rest = &chars[from..];
    let skip = rest.iter().take_while(|c| c.is_whitespace()).count();
    rest[skip..].starts_with(&['m', 'm'])
}

fn number(chars: &[char]) -> Option<f64> {
    chars.iter().collect::<String>().parse().ok()
}

// ---------------------------------------------------------------------------
// ConcentrationMap – label → mM
// ---------------------------------------------------------------------------

/// Known concentrations (mM) keyed by trace label. Labels without an entry
/// take no part in calibration.
pub type ConcentrationMap = BTreeMap<String, f64>;

/// Auto-label every trace whose name carries a concentration.
pub fn auto_concentrations<'a>(labels: impl IntoIterator<Item = &'a str>) -> ConcentrationMap {
    labels
        .into_iter()
        .filter_map(|label| extract_concentration(label).map(|c| (label.to_string(), c)))
        .collect()
}

/// A manual concentration entry that could not be read as a number.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("value for {label} is not a valid number: '{input}'")]
pub struct InputError {
    pub label: String,
    pub input: String,
}

/// Interpret manual text inputs. Blank inputs are left out, unparsable ones
/// are reported and left out.
pub fn resolve_manual<'a>(
    inputs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> (ConcentrationMap, Vec<InputError>) {
    let mut map = ConcentrationMap::new();
    let mut errors = Vec::new();

    for (label, text) in inputs {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match text.parse::<f64>() {
            Ok(value) => {
                map.insert(label.to_string(), value);
            }
            Err(_) => {
                log::warn!("Ignoring concentration for {label}: '{text}' is not a number");
                errors.push(InputError {
                    label: label.to_string(),
                    input: text.to_string(),
                });
            }
        }
    }
    (map, errors)
}

/// Text shown in a manual input seeded from an auto-extracted value.
pub fn format_concentration(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_typical_labels() {
        assert_eq!(extract_concentration("sample_10mm"), Some(10.0));
        assert_eq!(extract_concentration("CV 2.5 mM run3"), Some(2.5));
        assert_eq!(extract_concentration("glucose_0.25MM"), Some(0.25));
        assert_eq!(extract_concentration("blank"), None);
    }

    #[test]
    fn takes_leftmost_match_only() {
        assert_eq!(extract_concentration("v2_10mm_20mm"), Some(10.0));
        assert_eq!(extract_concentration("x12mm"), Some(12.0));
    }

    #[test]
    fn requires_digits_after_decimal_point() {
        assert_eq!(extract_concentration("10.mm"), None);
        assert_eq!(extract_concentration("1.2.5mm"), Some(2.5));
    }

    #[test]
    fn unit_must_be_mm() {
        assert_eq!(extract_concentration("5um"), None);
        assert_eq!(extract_concentration("5m_m"), None);
    }

    #[test]
    fn non_ascii_digits_are_not_numbers() {
        assert_eq!(extract_concentration("s_\u{ff11}\u{ff10}mm"), None);
        assert_eq!(extract_concentration("s_\u{0665}mm"), None);
        assert_eq!(extract_concentration("\u{ff11}_2mm"), Some(2.0));
    }

    #[test]
    fn manual_inputs_report_non_numeric() {
        let (map, errors) =
            resolve_manual([("a", " 1.5 "), ("b", ""), ("c", "ten"), ("d", "2")]);
        assert_eq!(map.get("a"), Some(&1.5));
        assert_eq!(map.get("d"), Some(&2.0));
        assert_eq!(map.len(), 2);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].label, "c");
    }

    #[test]
    fn auto_concentrations_skip_unlabelled() {
        let map = auto_concentrations(["a_1mm", "blank", "b_3mm"]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["b_3mm"], 3.0);
    }

    #[test]
    fn seeded_text_parses_back() {
        assert_eq!(format_concentration(10.0), "10.0");
        assert_eq!(format_concentration(0.25).parse::<f64>().unwrap(), 0.25);
    }
}
