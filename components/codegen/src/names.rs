//! Short identifier generation

use parser::lexer::is_keyword;

/// The `index`-th name in the sequence `a`..`z`, `aa`..`zz`, `aaa`...
pub fn name_for_index(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(char::from(b'a' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}

/// Yields short names in generation order, skipping reserved words
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    next: usize,
}

impl NameGenerator {
    /// Start from `a`
    pub fn new() -> Self {
        Self::default()
    }

    /// The first remaining name accepted by `available`
    pub fn next_available(&mut self, mut available: impl FnMut(&str) -> bool) -> String {
        loop {
            let name = name_for_index(self.next);
            self.next += 1;
            if !is_keyword(&name) && available(&name) {
                return name;
            }
        }
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.next_available(|_| true))
    }
}
