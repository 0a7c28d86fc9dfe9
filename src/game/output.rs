use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "text", rename_all = "lowercase")]
pub enum OutputBlock {
    Title(String),
    Text(String),
    Event(String),
    Companion(String),
}

impl OutputBlock {
    pub fn text(&self) -> &str {
        match self {
            Self::Title(s) | Self::Text(s) | Self::Event(s) | Self::Companion(s) => s,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Output {
    pub blocks: Vec<OutputBlock>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Title(s));
        }
    }

    pub fn say(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Text(s));
        }
    }

    pub fn event(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Event(s));
        }
    }

    pub fn companion(&mut self, s: impl Into<String>) {
        let s = s.into();
        if !s.trim().is_empty() {
            self.blocks.push(OutputBlock::Companion(s));
        }
    }

    pub fn append(&mut self, other: Output) {
        self.blocks.extend(other.blocks);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Event lines only, in order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            OutputBlock::Event(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_skipped() {
        let mut out = Output::new();
        out.say("   ");
        out.event("");
        out.title("Map");
        out.event("You rest.");
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.events().collect::<Vec<_>>(), vec!["You rest."]);
    }

    #[test]
    fn blocks_serialize_tagged() {
        let json = serde_json::to_value(OutputBlock::Companion("Hi".into())).unwrap();
        assert_eq!(json["type"], "companion");
        assert_eq!(json["text"], "Hi");
    }
}
