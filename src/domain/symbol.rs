/// Grid cells and the words embedded in them.
///
/// A cell belongs to at most one group: a candidate word or a special
/// token. The `Group` enum makes "both" unrepresentable.

/// Glyph left behind when a dud or a used special is disabled.
pub const FILLER: char = '.';

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Group {
    Word(usize),
    Special(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub text: char,
    pub group: Option<Group>,
    pub active: bool,
}

impl Symbol {
    pub fn noise(text: char) -> Self {
        Symbol { text, group: None, active: false }
    }

    pub fn word(text: char, id: usize) -> Self {
        Symbol { text, group: Some(Group::Word(id)), active: false }
    }

    pub fn special(text: char, id: usize) -> Self {
        Symbol { text, group: Some(Group::Special(id)), active: false }
    }

    #[allow(dead_code)]
    pub fn word_id(&self) -> Option<usize> {
        match self.group {
            Some(Group::Word(id)) => Some(id),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn special_id(&self) -> Option<usize> {
        match self.group {
            Some(Group::Special(id)) => Some(id),
            _ => None,
        }
    }

    /// Strip the cell of its group and reduce it to the filler glyph.
    pub fn disable(&mut self) {
        self.text = FILLER;
        self.group = None;
        self.active = false;
    }
}

/// A dictionary word placed in the grid. `id` is its placement order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateWord {
    pub id: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_ids_are_exclusive() {
        let w = Symbol::word('A', 3);
        assert_eq!(w.word_id(), Some(3));
        assert_eq!(w.special_id(), None);

        let s = Symbol::special('[', 1);
        assert_eq!(s.special_id(), Some(1));
        assert_eq!(s.word_id(), None);

        let n = Symbol::noise('%');
        assert!(n.group.is_none());
    }

    #[test]
    fn disable_makes_cell_inert() {
        let mut w = Symbol::word('Q', 0);
        w.active = true;
        w.disable();
        assert_eq!(w.text, FILLER);
        assert!(w.group.is_none());
        assert!(!w.active);
    }
}
