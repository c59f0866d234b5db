//! Labelled example phrases the intent index is built from

/// Example phrases for one intent label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub label: String,
    pub phrases: Vec<String>,
}

/// Ordered label -> phrases table; order decides ties in the index
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    ("takeoff", &["take off", "please take off", "can you take off", "lift off", "start flying"]),
    ("land", &["land", "please land", "can you land", "stop flying", "touch down"]),
    ("forward", &["go forward", "move forward", "fly forward"]),
    ("back", &["go back", "move back", "fly backward"]),
    ("left", &["go left", "move left", "fly to the left"]),
    ("right", &["go right", "move right", "fly to the right"]),
    ("up", &["go up", "fly higher", "ascend", "climb up"]),
    ("down", &["go down", "fly lower", "descend"]),
    ("excited", &["get excited", "do a jump", "show excitement", "bounce", "good"]),
    ("happy", &["be happy", "do a happy dance", "wiggle", "celebrate"]),
    ("sad", &["look sad", "be sad", "descend sadly"]),
    ("spin", &["spin", "spin around", "twirl"]),
    ("shake", &["shake", "shake your head", "wiggle head"]),
    ("come_here", &["come here", "fly to me", "come closer", "approach me"]),
    ("stop", &["stop", "halt", "land now", "end movement"]),
    ("learn_trick", &["learn a new trick", "teach a new trick", "create a command"]),
    ("end_trick", &["end trick", "and trick", "finish trick", "done with trick", "save trick"]),
];

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in command vocabulary
    pub fn builtin() -> Self {
        let mut vocabulary = Self::new();
        for (label, phrases) in BUILTIN {
            vocabulary.insert(label, phrases.iter().copied());
        }
        vocabulary
    }

    /// Add phrases under a label, creating the label if needed. Returns
    /// true if the label is new.
    pub fn insert<I, S>(&mut self, label: &str, phrases: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let phrases = phrases.into_iter().map(Into::into);

        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                for phrase in phrases {
                    if !entry.phrases.contains(&phrase) {
                        entry.phrases.push(phrase);
                    }
                }
                false
            }
            None => {
                self.entries.push(VocabularyEntry {
                    label: label.to_string(),
                    phrases: phrases.collect(),
                });
                true
            }
        }
    }

    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|e| e.label == label)
    }


    /// Every (label, phrase) pair in table order
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|e| e.phrases.iter().map(move |p| (e.label.as_str(), p.as_str())))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
