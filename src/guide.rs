/// One step of the five-paragraph essay structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphGuide {
    pub title: &'static str,
    pub description: &'static str,
    pub goal: &'static str,
}

pub const PARAGRAPH_COUNT: usize = 5;

/// Index of the final paragraph; advancing past it completes the essay.
pub const LAST_PARAGRAPH: usize = PARAGRAPH_COUNT - 1;

pub static PARAGRAPH_GUIDES: [ParagraphGuide; PARAGRAPH_COUNT] = [
    ParagraphGuide {
        title: "Paragraph 1: Opening (state the theme)",
        description: "Break open the core image of the prompt and state your thesis. Suggested length: 100-150 characters.",
        goal: "Introduce the heart of the prompt, make the main line of the essay explicit and draw the reader in.",
    },
    ParagraphGuide {
        title: "Paragraph 2: Development (experience)",
        description: "Carry the thesis into a concrete experience or observation from your own life. Suggested length: 150-200 characters.",
        goal: "Use sensory detail to make the experience specific and echo the thesis of the opening.",
    },
    ParagraphGuide {
        title: "Paragraph 3: Turn (deepening)",
        description: "Draw a deeper insight or a turn out of the experience. Suggested length: 150-200 characters.",
        goal: "Dig beneath the surface for meaning and show depth of thought and feeling.",
    },
    ParagraphGuide {
        title: "Paragraph 4: Synthesis (broadening)",
        description: "Connect the personal insight to a general truth or a wider social phenomenon. Suggested length: 100-150 characters.",
        goal: "See the large in the small and lift the feeling toward a universal value.",
    },
    ParagraphGuide {
        title: "Paragraph 5: Closing (resonance)",
        description: "Sum up the essay, echo the opening and leave a lingering note. Suggested length: 80-120 characters.",
        goal: "Finish with force, gather the feeling of the whole piece and give the reader a sense of completeness.",
    },
];

/// Guide for the paragraph at `index`, if it is within the essay.
pub fn guide_for(index: usize) -> Option<&'static ParagraphGuide> {
    PARAGRAPH_GUIDES.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_five_entries() {
        assert_eq!(PARAGRAPH_GUIDES.len(), 5);
        assert_eq!(LAST_PARAGRAPH, 4);
    }

    #[test]
    fn guide_lookup_is_bounded() {
        assert!(guide_for(0).unwrap().title.starts_with("Paragraph 1"));
        assert!(guide_for(4).unwrap().title.starts_with("Paragraph 5"));
        assert!(guide_for(5).is_none());
    }

    #[test]
    fn every_entry_is_filled_in() {
        for guide in PARAGRAPH_GUIDES.iter() {
            assert!(!guide.title.is_empty());
            assert!(!guide.description.is_empty());
            assert!(!guide.goal.is_empty());
        }
    }
}
