//! The built-in catalog of tone presets and the frequency-label parser.

/// A catalog record. Only `frequency` drives audio; the rest is display text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub phrase: &'static str,
    pub image: &'static str,
    /// Label such as `"432 Hz + 963 Hz"`
    pub frequency: &'static str,
    pub colors: &'static str,
    pub geometry: &'static str,
}

impl CatalogEntry {
    /// Base frequencies of this entry, in label order
    pub fn frequencies(&self) -> Vec<f32> {
        parse_frequencies(self.frequency)
    }
}

pub static CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Breast Cancer",
        phrase: "Within you is the strength of a thousand mountains. This is a path to discovering your own power.",
        image: "breast_cancer.png",
        frequency: "432 Hz + 963 Hz",
        colors: "Rose Quartz & Violet",
        geometry: "Flower of Life",
    },
    CatalogEntry {
        name: "Lung Cancer",
        phrase: "Every breath is a victory. Let your spirit soar on the winds of courage.",
        image: "lung_cancer.png",
        frequency: "741 Hz + 852 Hz",
        colors: "Jade Green & Turquoise",
        geometry: "Breathing Toroid",
    },
    CatalogEntry {
        name: "Prostate Cancer",
        phrase: "Your journey is one of endurance and wisdom. Stand tall in your unwavering resolve.",
        image: "prostate_cancer.png",
        frequency: "444 Hz + 741 Hz",
        colors: "Indigo Blue & Copper",
        geometry: "Merkaba Inner Cube",
    },
    CatalogEntry {
        name: "Colon Cancer",
        phrase: "You are navigating the winding rivers of life. Trust in your resilience to find the open sea.",
        image: "colon_cancer.png",
        frequency: "417 Hz + 528 Hz",
        colors: "Electric Blue & Amber",
        geometry: "Fibonacci Spiral",
    },
    CatalogEntry {
        name: "Melanoma",
        phrase: "Your light shines from within, too bright to be overshadowed. Embrace your radiant spirit.",
        image: "melanoma.png",
        frequency: "285 Hz + 963 Hz",
        colors: "Ultraviolet & Magenta",
        geometry: "Solar Hexagon",
    },
    CatalogEntry {
        name: "Leukemia",
        phrase: "Within your very essence flows a current of immense strength and renewal. You are life, remade.",
        image: "leukemia.png",
        frequency: "528 Hz + 963 Hz",
        colors: "Gold & White",
        geometry: "12-Pointed Star",
    },
    CatalogEntry {
        name: "Pancreatic Cancer",
        phrase: "In the core of your being lies a hidden strength. Unearth it and let it guide you.",
        image: "pancreatic_cancer.png",
        frequency: "528 Hz + 888 Hz",
        colors: "Liquid Gold & Olive",
        geometry: "Vesica Piscis",
    },
    CatalogEntry {
        name: "Liver Cancer",
        phrase: "You are a vessel of regeneration and strength. Trust in your body's profound ability to heal.",
        image: "liver_cancer.png",
        frequency: "639 Hz + 1111 Hz",
        colors: "Solar Orange & Indigo",
        geometry: "Metatron's Cube",
    },
    CatalogEntry {
        name: "Ovarian Cancer",
        phrase: "From the deepest source of life comes your greatest strength. You are a creator of hope.",
        image: "ovarian_cancer.png",
        frequency: "396 Hz + 417 Hz",
        colors: "Teal & Pearl White",
        geometry: "Vesica Piscis with Pearl",
    },
    CatalogEntry {
        name: "Brain Cancer",
        phrase: "Your mind is a universe of potential. Harness its infinite power to forge new pathways of healing.",
        image: "brain_cancer.png",
        frequency: "963 Hz + 1440 Hz",
        colors: "Violet & Silver",
        geometry: "Crystal Octahedron",
    },
    CatalogEntry {
        name: "Stomach Cancer",
        phrase: "You are the center of your own strength. Digest challenges and transform them into nourishment for your spirit.",
        image: "stomach_cancer.png",
        frequency: "396 Hz + 639 Hz",
        colors: "Ruby Red & White",
        geometry: "Sacred Triangle",
    },
];

/// Find a catalog entry by its display name
pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}

/// Parse a frequency label like `"432 Hz + 963 Hz"`.
///
/// Every `Hz` is removed, the rest is split on `+`, and each part is read
/// as the longest leading decimal number after trimming. Parts with no
/// leading number become NaN; the tone session skips those.
pub fn parse_frequencies(label: &str) -> Vec<f32> {
    label
        .replace("Hz", "")
        .split('+')
        .map(|part| parse_leading_number(part.trim()))
        .collect()
}

fn parse_leading_number(s: &str) -> f32 {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return f32::NAN;
    }

    // Exponent only counts when it has digits
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f32::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_has_two_usable_frequencies() {
        assert_eq!(CATALOG.len(), 11);
        for entry in CATALOG {
            let freqs = entry.frequencies();
            assert_eq!(freqs.len(), 2, "{}", entry.name);
            assert!(freqs.iter().all(|f| f.is_finite() && *f > 0.0), "{}", entry.name);
        }
    }

    #[test]
    fn parses_labels() {
        assert_eq!(parse_frequencies("432 Hz + 963 Hz"), vec![432.0, 963.0]);
        assert_eq!(parse_frequencies("639Hz+1111Hz"), vec![639.0, 1111.0]);
        assert_eq!(parse_frequencies("  7.83 Hz"), vec![7.83]);
        assert_eq!(parse_frequencies("528 tone"), vec![528.0]);
        assert_eq!(parse_frequencies("1e3 Hz"), vec![1000.0]);
        assert_eq!(parse_frequencies("12e Hz"), vec![12.0]);
    }

    #[test]
    fn unparseable_parts_become_nan() {
        let freqs = parse_frequencies("abc + 528 Hz");
        assert!(freqs[0].is_nan());
        assert_eq!(freqs[1], 528.0);

        assert!(parse_frequencies("")[0].is_nan());
        assert!(parse_frequencies(". Hz")[0].is_nan());
    }

    #[test]
    fn find_by_name() {
        let entry = find("Liver Cancer").unwrap();
        assert_eq!(entry.frequencies(), vec![639.0, 1111.0]);
        assert!(find("Nothing").is_none());
    }
}
