//! Line-oriented text builder and number formatting for netlists.

/// Accumulates netlist lines. Sections are rendered into their own builder
/// and spliced in with [`TextBuilder::section`].
#[derive(Clone, Debug, Default)]
pub struct TextBuilder {
    lines: Vec<String>,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    /// A `*` comment line.
    pub fn comment(self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.line("*")
        } else {
            self.line(format!("* {}", text))
        }
    }

    pub fn blank(self) -> Self {
        self.line("")
    }

    /// `.param name = value`
    pub fn param(self, name: &str, value: impl AsRef<str>) -> Self {
        self.line(format!(".param {} = {}", name, value.as_ref()))
    }

    /// Append a rendered block. Empty blocks are dropped.
    pub fn section(mut self, block: String) -> Self {
        if !block.is_empty() {
            self.lines.extend(block.lines().map(str::to_string));
        }
        self
    }

    /// Lines joined with `\n`, with a trailing newline.
    pub fn build(self) -> String {
        let mut out = self.lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// Plain number for netlist text: decimal in the readable range, otherwise
/// scientific notation.
pub fn num(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let mag = x.abs();
    if (1e-3..1e6).contains(&mag) {
        format!("{}", x)
    } else {
        format!("{:e}", x)
    }
}

const SCALES: [(f64, &str); 10] = [
    (1e12, "T"),
    (1e9, "G"),
    (1e6, "Meg"),
    (1e3, "k"),
    (1.0, ""),
    (1e-3, "m"),
    (1e-6, "u"),
    (1e-9, "n"),
    (1e-12, "p"),
    (1e-15, "f"),
];

/// Number with a SPICE scale suffix, e.g. `10Meg` or `100p`.
pub fn si(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let mag = x.abs();
    let (scale, suffix) = SCALES
        .iter()
        .copied()
        .find(|(scale, _)| mag >= *scale * (1.0 - 1e-12))
        .unwrap_or(SCALES[SCALES.len() - 1]);

    let mantissa = format!("{:.6}", x / scale);
    let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}", mantissa, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_joins_sections() {
        let inner = TextBuilder::new().line("R1 A B 1").line("C1 B 0 1p").build();
        let text = TextBuilder::new()
            .comment("hello")
            .section(inner)
            .section(String::new())
            .blank()
            .param("freq", "10Meg")
            .build();

        assert_eq!(text, "* hello\nR1 A B 1\nC1 B 0 1p\n\n.param freq = 10Meg\n");
    }

    #[test]
    fn test_num() {
        assert_eq!(num(0.0), "0");
        assert_eq!(num(-0.0), "0");
        assert_eq!(num(3.3), "3.3");
        assert_eq!(num(-0.05), "-0.05");
        assert_eq!(num(2.8774e-12), "2.8774e-12");
        assert_eq!(num(1e7), "1e7");
    }

    #[test]
    fn test_si() {
        assert_eq!(si(10e6), "10Meg");
        assert_eq!(si(10e-9), "10n");
        assert_eq!(si(0.1e-12), "100f");
        assert_eq!(si(0.5), "500m");
        assert_eq!(si(1.0), "1");
        assert_eq!(si(2.5e3), "2.5k");
    }
}
