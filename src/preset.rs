//! Response-style presets and the generation parameters they map to.
//!
//! A preset is a named bundle of sampling parameters. The table is static:
//! callers pick a label, never individual numbers. Numeric ranges are not
//! validated; the remote API is the judge of what it accepts.

use std::fmt;

/// Fixed generation parameters attached to a [`Preset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// Remote model identifier, e.g. `gemini-1.5-pro`.
    pub model: &'static str,
    pub temperature: f64,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

/// User-selectable response style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Measured, complete answers. (default)
    #[default]
    Formal,
    /// High temperature, longer answers from the faster model.
    Creative,
    /// Low temperature, short answers.
    Concise,
}

const FORMAL: GenerationParams = GenerationParams {
    model: "gemini-1.5-pro",
    temperature: 1.0,
    top_p: 0.94,
    max_output_tokens: 2000,
};

const CREATIVE: GenerationParams = GenerationParams {
    model: "gemini-1.5-flash",
    temperature: 1.5,
    top_p: 0.95,
    max_output_tokens: 2500,
};

const CONCISE: GenerationParams = GenerationParams {
    model: "gemini-1.5-pro",
    temperature: 0.3,
    top_p: 0.8,
    max_output_tokens: 1000,
};

impl Preset {
    /// All presets in display order.
    pub const ALL: [Preset; 3] = [Preset::Formal, Preset::Creative, Preset::Concise];

    /// Map a label to a preset. Only the exact labels (`"Formal"`,
    /// `"Creative"`, `"Concise"`) match; anything else is
    /// [`Preset::Formal`].
    pub fn from_label(label: &str) -> Preset {
        Self::ALL
            .into_iter()
            .find(|p| p.label() == label)
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::Formal => "Formal",
            Preset::Creative => "Creative",
            Preset::Concise => "Concise",
        }
    }

    /// One-line hint rendered next to the radio button.
    pub fn description(self) -> &'static str {
        match self {
            Preset::Formal => "balanced, complete answers",
            Preset::Creative => "freer wording, longer answers",
            Preset::Concise => "short, focused answers",
        }
    }

    pub fn params(self) -> GenerationParams {
        match self {
            Preset::Formal => FORMAL,
            Preset::Creative => CREATIVE,
            Preset::Concise => CONCISE,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve a style label straight to its generation parameters.
pub fn resolve_preset(label: &str) -> GenerationParams {
    Preset::from_label(label).params()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_labels_return_their_tuple() {
        let creative = resolve_preset("Creative");
        assert_eq!(
            (creative.model, creative.temperature, creative.top_p, creative.max_output_tokens),
            ("gemini-1.5-flash", 1.5, 0.95, 2500)
        );

        let concise = resolve_preset("Concise");
        assert_eq!(
            (concise.model, concise.temperature, concise.top_p, concise.max_output_tokens),
            ("gemini-1.5-pro", 0.3, 0.8, 1000)
        );

        let formal = resolve_preset("Formal");
        assert_eq!(
            (formal.model, formal.temperature, formal.top_p, formal.max_output_tokens),
            ("gemini-1.5-pro", 1.0, 0.94, 2000)
        );
    }

    #[test]
    fn unknown_label_falls_back_to_formal() {
        assert_eq!(resolve_preset("Sarcastic"), Preset::Formal.params());
        assert_eq!(resolve_preset(""), Preset::Formal.params());
        assert_eq!(Preset::from_label("Poetic"), Preset::Formal);
    }

    #[test]
    fn label_match_is_exact() {
        assert_eq!(resolve_preset("concise"), Preset::Formal.params());
        assert_eq!(resolve_preset(" Creative "), Preset::Formal.params());
        assert_eq!(Preset::from_label("CONCISE"), Preset::Formal);
    }

    #[test]
    fn labels_round_trip() {
        for p in Preset::ALL {
            assert_eq!(Preset::from_label(p.label()), p);
            assert_eq!(p.to_string(), p.label());
        }
    }

    #[test]
    fn default_is_formal() {
        assert_eq!(Preset::default(), Preset::Formal);
    }
}
