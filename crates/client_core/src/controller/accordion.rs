use shared::i18n::MessageKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Upload,
    Style,
    Academic,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Upload, Section::Style, Section::Academic];

    pub fn title(self) -> MessageKey {
        match self {
            Self::Upload => MessageKey::SectionUpload,
            Self::Style => MessageKey::SectionStyle,
            Self::Academic => MessageKey::SectionAcademic,
        }
    }
}

/// Single-open accordion: exactly one section is open whenever the group is
/// non-empty, starting with the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accordion {
    sections: Vec<Section>,
    open: Option<usize>,
}

impl Default for Accordion {
    fn default() -> Self {
        Self::new(Section::ALL.to_vec())
    }
}

impl Accordion {
    pub fn new(sections: Vec<Section>) -> Self {
        let open = (!sections.is_empty()).then_some(0);
        Self { sections, open }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    pub fn open_section(&self) -> Option<Section> {
        self.open.and_then(|index| self.sections.get(index).copied())
    }

    pub fn open_count(&self) -> usize {
        (0..self.sections.len()).filter(|index| self.is_open(*index)).count()
    }

    /// Header click: opens `index` and closes its siblings. Clicking the open
    /// header keeps it open. Returns whether the open section changed.
    pub fn click(&mut self, index: usize) -> bool {
        if index >= self.sections.len() || self.open == Some(index) {
            return false;
        }
        self.open = Some(index);
        true
    }

    pub fn click_section(&mut self, section: Section) -> bool {
        match self.sections.iter().position(|candidate| *candidate == section) {
            Some(index) => self.click(index),
            None => false,
        }
    }
}
