/// Typewriter output log.
///
/// Lines queued through `Display` are revealed a few characters per tick,
/// top to bottom. Only the line being typed and those above it are
/// visible. The log keeps at most `max_lines`, dropping the oldest.

use std::collections::VecDeque;

use super::presenter::{Display, Style};

#[derive(Clone, Debug)]
struct LogLine {
    text: String,
    style: Style,
    len: usize,
    shown: usize,
}

impl LogLine {
    fn done(&self) -> bool {
        self.shown >= self.len
    }

    fn visible(&self) -> &str {
        let end = self.text.char_indices()
            .nth(self.shown)
            .map_or(self.text.len(), |(i, _)| i);
        &self.text[..end]
    }
}

#[derive(Clone, Debug)]
pub struct OutputLog {
    lines: VecDeque<LogLine>,
    chars_per_tick: usize,
    max_lines: usize,
}

impl OutputLog {
    pub fn new(chars_per_tick: usize, max_lines: usize) -> Self {
        OutputLog {
            lines: VecDeque::new(),
            chars_per_tick: chars_per_tick.max(1),
            max_lines: max_lines.max(1),
        }
    }

    /// Reveal the next `chars_per_tick` characters.
    pub fn tick(&mut self) {
        let mut budget = self.chars_per_tick;
        for line in self.lines.iter_mut().filter(|l| !l.done()) {
            let take = budget.min(line.len - line.shown);
            line.shown += take;
            budget -= take;
            if budget == 0 { break; }
        }
    }

    /// Reveal everything at once (skip key).
    pub fn finish(&mut self) {
        for line in &mut self.lines {
            line.shown = line.len;
        }
    }

    pub fn is_idle(&self) -> bool {
        self.lines.iter().all(LogLine::done)
    }

    /// Lines as currently typed: every finished line plus the partial one.
    pub fn visible(&self) -> Vec<(&str, Style)> {
        let mut out = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            out.push((line.visible(), line.style));
            if !line.done() { break; }
        }
        out
    }
}

impl Display for OutputLog {
    fn display(&mut self, lines: &[&str], style: Style) {
        for text in lines {
            let len = text.chars().count();
            self.lines.push_back(LogLine { text: (*text).to_string(), style, len, shown: 0 });
        }
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(log: &OutputLog) -> Vec<&str> {
        log.visible().into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn types_a_few_chars_per_tick() {
        let mut log = OutputLog::new(2, 10);
        log.display(&[">GARDEN"], Style::Plain);
        assert!(!log.is_idle());
        assert_eq!(shown(&log), [""]);
        log.tick();
        assert_eq!(shown(&log), [">G"]);
        for _ in 0..3 { log.tick(); }
        assert_eq!(shown(&log), [">GARDEN"]);
        assert!(log.is_idle());
    }

    #[test]
    fn later_lines_wait_their_turn() {
        let mut log = OutputLog::new(3, 10);
        log.display(&["ab", "", "cdef"], Style::Alert);
        log.tick();
        // "ab" uses 2, the empty line is free, "c" takes the last one
        assert_eq!(shown(&log), ["ab", "", "c"]);
        log.tick();
        assert_eq!(shown(&log), ["ab", "", "cdef"]);
        assert!(log.visible().iter().all(|(_, s)| *s == Style::Alert));
    }

    #[test]
    fn multibyte_glyphs_type_whole() {
        let mut log = OutputLog::new(1, 10);
        log.display(&["■ ■"], Style::Plain);
        log.tick();
        assert_eq!(shown(&log), ["■"]);
    }

    #[test]
    fn finish_and_clear() {
        let mut log = OutputLog::new(1, 10);
        log.display(&["Terminal locked", "Terminal will unlock in 30 seconds"], Style::Alert);
        log.finish();
        assert!(log.is_idle());
        assert_eq!(shown(&log).len(), 2);
        log.clear();
        assert!(log.visible().is_empty());
        assert!(log.is_idle());
    }

    #[test]
    fn drops_oldest_beyond_capacity() {
        let mut log = OutputLog::new(1, 2);
        log.display(&["one", "two", "three"], Style::Plain);
        log.finish();
        assert_eq!(shown(&log), ["two", "three"]);
    }
}
