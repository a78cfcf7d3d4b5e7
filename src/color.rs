use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.45);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category colours
// ---------------------------------------------------------------------------

/// Maps each category to a distinct colour for the results table.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    /// `categories` is expected sorted and de-duplicated, so colours stay
    /// stable between reloads of the same data.
    pub fn new(categories: &[String]) -> Self {
        let mapping = categories
            .iter()
            .filter(|c| !c.is_empty())
            .cloned()
            .zip(generate_palette(categories.len()))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping.get(category).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_entries() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_and_empty_categories_are_gray() {
        let colors = CategoryColors::new(&["".to_string(), "Frenos".to_string()]);
        assert_ne!(colors.color_for("Frenos"), Color32::GRAY);
        assert_eq!(colors.color_for(""), Color32::GRAY);
        assert_eq!(colors.color_for("Motor"), Color32::GRAY);
    }
}
