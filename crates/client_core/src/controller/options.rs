//! Processing option toggles and their cascade rules.

use std::ops::RangeInclusive;

use shared::{
    domain::{Layout, PaperFormat, VectorFormat},
    protocol::{AcademicOptions, CustomParams, ProcessOptions},
};

pub const DPI_RANGE: RangeInclusive<u32> = 72..=1200;
pub const FONT_SIZE_RANGE: RangeInclusive<u32> = 6..=24;
pub const TITLE_SIZE_RANGE: RangeInclusive<u32> = 8..=32;
pub const FIG_WIDTH_RANGE: RangeInclusive<f32> = 1.0..=12.0;
pub const FIG_HEIGHT_RANGE: RangeInclusive<f32> = 1.0..=10.0;

const DEFAULT_DPI: u32 = 300;

fn default_custom_params() -> CustomParams {
    CustomParams {
        font_size: 10,
        title_size: 12,
        fig_width: 3.5,
        fig_height: 2.6,
        custom_dpi: DEFAULT_DPI,
    }
}

/// Option panel state. `custom_mode` depends on `academic_mode`: switching
/// academic mode off forces custom mode off, switching it back on leaves
/// custom mode as it is.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionPanel {
    beautify: bool,
    academic_mode: bool,
    custom_mode: bool,
    pub paper_format: PaperFormat,
    pub layout: Layout,
    pub vector_format: Option<VectorFormat>,
    pub dpi: u32,
    pub custom: CustomParams,
}

impl Default for OptionPanel {
    fn default() -> Self {
        Self {
            beautify: false,
            academic_mode: false,
            custom_mode: false,
            paper_format: PaperFormat::default(),
            layout: Layout::default(),
            vector_format: None,
            dpi: DEFAULT_DPI,
            custom: default_custom_params(),
        }
    }
}

impl OptionPanel {
    pub fn beautify(&self) -> bool {
        self.beautify
    }

    pub fn academic_mode(&self) -> bool {
        self.academic_mode
    }

    pub fn custom_mode(&self) -> bool {
        self.custom_mode
    }

    pub fn set_beautify(&mut self, enabled: bool) {
        self.beautify = enabled;
    }

    pub fn set_academic_mode(&mut self, enabled: bool) {
        self.academic_mode = enabled;
        if !enabled {
            self.custom_mode = false;
        }
    }

    pub fn set_custom_mode(&mut self, enabled: bool) {
        self.custom_mode = enabled;
    }

    pub fn academic_options_visible(&self) -> bool {
        self.academic_mode
    }

    pub fn custom_options_visible(&self) -> bool {
        self.academic_mode && self.custom_mode
    }

    /// Turns every toggle off and restores default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Options to submit, with out-of-range values clamped to what the
    /// controls allow.
    pub fn snapshot(&self) -> ProcessOptions {
        let academic = self.academic_mode.then(|| AcademicOptions {
            paper_format: self.paper_format,
            layout: self.layout,
            vector_format: self.vector_format,
            dpi: clamp(self.dpi, &DPI_RANGE),
            custom: self.custom_mode.then(|| CustomParams {
                font_size: clamp(self.custom.font_size, &FONT_SIZE_RANGE),
                title_size: clamp(self.custom.title_size, &TITLE_SIZE_RANGE),
                fig_width: clamp(self.custom.fig_width, &FIG_WIDTH_RANGE),
                fig_height: clamp(self.custom.fig_height, &FIG_HEIGHT_RANGE),
                custom_dpi: clamp(self.custom.custom_dpi, &DPI_RANGE),
            }),
        });

        ProcessOptions {
            beautify: self.beautify,
            academic,
        }
    }
}

fn clamp<T: PartialOrd + Copy>(value: T, range: &RangeInclusive<T>) -> T {
    if value < *range.start() {
        *range.start()
    } else if value > *range.end() {
        *range.end()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabling_academic_mode_cascades_to_custom_mode() {
        let mut panel = OptionPanel::default();
        panel.set_academic_mode(true);
        panel.set_custom_mode(true);
        assert!(panel.custom_options_visible());

        panel.set_academic_mode(false);
        assert!(!panel.custom_mode());
        assert!(!panel.academic_options_visible());
        assert!(!panel.custom_options_visible());

        panel.set_academic_mode(true);
        assert!(!panel.custom_mode(), "re-enabling the parent must not re-enable children");
    }

    #[test]
    fn custom_controls_stay_hidden_while_academic_mode_is_off() {
        let sequences: [&[(&str, bool)]; 4] = [
            &[("custom", true)],
            &[("academic", true), ("custom", true), ("academic", false), ("custom", true)],
            &[("custom", true), ("academic", false)],
            &[("academic", true), ("academic", false), ("custom", true), ("custom", false)],
        ];

        for sequence in sequences {
            let mut panel = OptionPanel::default();
            for (toggle, enabled) in sequence {
                match *toggle {
                    "academic" => panel.set_academic_mode(*enabled),
                    _ => panel.set_custom_mode(*enabled),
                }
            }
            if !panel.academic_mode() {
                assert!(!panel.custom_options_visible(), "sequence {sequence:?}");
                assert!(panel.snapshot().academic.is_none());
            }
        }
    }

    #[test]
    fn snapshot_nests_groups_by_toggle() {
        let mut panel = OptionPanel::default();
        panel.set_beautify(true);
        assert_eq!(
            panel.snapshot(),
            ProcessOptions {
                beautify: true,
                academic: None
            }
        );

        panel.set_academic_mode(true);
        panel.vector_format = Some(VectorFormat::Pdf);
        let academic = panel.snapshot().academic.expect("academic group");
        assert_eq!(academic.vector_format, Some(VectorFormat::Pdf));
        assert!(academic.custom.is_none());

        panel.set_custom_mode(true);
        assert!(panel.snapshot().academic.and_then(|a| a.custom).is_some());
    }

    #[test]
    fn snapshot_clamps_values_to_control_ranges() {
        let mut panel = OptionPanel::default();
        panel.set_academic_mode(true);
        panel.set_custom_mode(true);
        panel.dpi = 5;
        panel.custom.fig_width = 40.0;

        let academic = panel.snapshot().academic.expect("academic group");
        assert_eq!(academic.dpi, 72);
        assert_eq!(academic.custom.expect("custom").fig_width, 12.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut panel = OptionPanel::default();
        panel.set_beautify(true);
        panel.set_academic_mode(true);
        panel.set_custom_mode(true);
        panel.layout = Layout::Double;

        panel.reset();
        assert_eq!(panel, OptionPanel::default());
    }
}
