// ============================================================
// Layer 4 — Question Preprocessor
// ============================================================
// Cleans one question before tokenisation.
//
// Questions come from scraped web text and often contain:
//   - Non-breaking / zero-width spaces
//   - Stray control characters and carriage returns
//   - Runs of spaces from copy-pasting
//
// A question is always a single line after cleaning: every
// whitespace variant becomes one plain space and the result is
// trimmed. Casing is left alone; the tokenizer's normaliser
// lowercases.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Collapse all whitespace / control characters into single spaces.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = true; // swallows leading whitespace

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_whitespace() || c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // At most one trailing space can remain
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}
