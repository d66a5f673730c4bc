//! EUI vocabulary tables: root keywords with their parameters, plus event actions.
//!
//! The tables are `'static` and never mutated. Completion code borrows them
//! through a `Vocabulary` and builds fresh items from the entries.

/// A parameter accepted by a keyword (e.g., `title` on `window`).
#[derive(Debug, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// A root keyword naming a UI component type.
#[derive(Debug, PartialEq)]
pub struct KeywordSpec {
    pub name: &'static str,
    pub description: &'static str,
    /// Registered parameters in declaration order. Empty when none are known.
    pub params: &'static [ParamSpec],
}

/// A built-in action usable as the value of an event attribute like `click`.
/// Names carry their trailing `=`.
#[derive(Debug, PartialEq)]
pub struct ActionVerb {
    pub name: &'static str,
    pub description: &'static str,
}

/// All root keywords, in suggestion order.
pub const KEYWORDS: &[KeywordSpec] = &[
    KeywordSpec {
        name: "window",
        description: "Window configuration",
        params: &[
            ParamSpec {
                name: "title",
                description: "Window title",
            },
            ParamSpec {
                name: "width",
                description: "Width",
            },
            ParamSpec {
                name: "height",
                description: "Height",
            },
        ],
    },
    KeywordSpec {
        name: "label",
        description: "Text label",
        params: &[],
    },
    KeywordSpec {
        name: "entry",
        description: "Input box",
        params: &[],
    },
    KeywordSpec {
        name: "button",
        description: "Button",
        params: &[
            ParamSpec {
                name: "text",
                description: "Button text",
            },
            ParamSpec {
                name: "id",
                description: "Component ID",
            },
            ParamSpec {
                name: "click",
                description: "Click event",
            },
        ],
    },
    KeywordSpec {
        name: "image",
        description: "Image",
        params: &[
            ParamSpec {
                name: "path",
                description: "Image path",
            },
            ParamSpec {
                name: "url",
                description: "Image URL",
            },
            ParamSpec {
                name: "width",
                description: "Width",
            },
        ],
    },
    KeywordSpec {
        name: "combo",
        description: "Drop-down box",
        params: &[],
    },
    KeywordSpec {
        name: "slider",
        description: "Slider",
        params: &[],
    },
    KeywordSpec {
        name: "timer",
        description: "Timer",
        params: &[],
    },
];

/// Event actions (e.g., `click="play_audio=bgm"`).
pub const ACTIONS: &[ActionVerb] = &[
    ActionVerb {
        name: "play_audio=",
        description: "Play audio",
    },
    ActionVerb {
        name: "显示=",
        description: "Show a component's value",
    },
    ActionVerb {
        name: "start_timer=",
        description: "Start a timer",
    },
];

static BUILTIN: Vocabulary = Vocabulary::new(KEYWORDS, ACTIONS);

/// Read-only view over a keyword table and an action table.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    keywords: &'static [KeywordSpec],
    actions: &'static [ActionVerb],
}

impl Vocabulary {
    pub const fn new(keywords: &'static [KeywordSpec], actions: &'static [ActionVerb]) -> Self {
        Self { keywords, actions }
    }

    /// The built-in EUI vocabulary.
    pub fn global() -> &'static Vocabulary {
        &BUILTIN
    }

    pub fn keywords(&self) -> &'static [KeywordSpec] {
        self.keywords
    }

    pub fn actions(&self) -> &'static [ActionVerb] {
        self.actions
    }

    /// Look up a keyword by exact name.
    pub fn keyword(&self, name: &str) -> Option<&'static KeywordSpec> {
        self.keywords.iter().find(|k| k.name == name)
    }

    /// Look up an action verb by name, with or without its trailing `=`.
    pub fn action(&self, name: &str) -> Option<&'static ActionVerb> {
        self.actions
            .iter()
            .find(|a| a.name == name || a.name.strip_suffix('=') == Some(name))
    }

    /// Parameters registered for `keyword`; empty for unknown keywords too.
    pub fn params_for(&self, keyword: &str) -> &'static [ParamSpec] {
        self.keyword(keyword).map(|k| k.params).unwrap_or(&[])
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        BUILTIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_in_declaration_order() {
        let names: Vec<&str> = Vocabulary::global().keywords().iter().map(|k| k.name).collect();
        assert_eq!(
            names,
            ["window", "label", "entry", "button", "image", "combo", "slider", "timer"]
        );
    }

    #[test]
    fn window_params() {
        let names: Vec<&str> = Vocabulary::global()
            .params_for("window")
            .iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["title", "width", "height"]);
    }

    #[test]
    fn keyword_without_params_is_still_registered() {
        let vocab = Vocabulary::global();
        assert!(vocab.keyword("label").is_some());
        assert!(vocab.params_for("label").is_empty());
    }

    #[test]
    fn unknown_keyword_has_no_params() {
        assert!(Vocabulary::global().params_for("textarea").is_empty());
        assert!(Vocabulary::global().keyword("textarea").is_none());
    }

    #[test]
    fn action_lookup_with_or_without_equals() {
        let vocab = Vocabulary::global();
        assert_eq!(vocab.action("play_audio=").map(|a| a.name), Some("play_audio="));
        assert_eq!(vocab.action("start_timer").map(|a| a.name), Some("start_timer="));
        assert!(vocab.action("stop").is_none());
    }

    #[test]
    fn actions_all_end_with_equals() {
        assert!(ACTIONS.iter().all(|a| a.name.ends_with('=')));
    }
}
