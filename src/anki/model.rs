pub const DECK_ID: i64 = 1988534729;
pub const DECK_NAME: &str = "WaniKani Audio Cards";
pub const MODEL_ID: i64 = 1959455220;
pub const MODEL_NAME: &str = "WaniVocab Audio Model";

pub const FIELD_NAMES: [&str; 5] = ["Audio", "Readings", "PartOfSpeech", "Meanings", "MeaningLong"];

const FRONT_TEMPLATE: &str = r#"<div class="audio">{{Audio}}</div>"#;

const BACK_TEMPLATE: &str = concat!(
    "<h1>{{Readings}}</h1>",
    r#"<div>Meanings:<br><div class="meanings">{{Meanings}}</div></div>"#,
    "<p>Part of Speech: <b>{{PartOfSpeech}}</b></p>",
    "<hr>",
    "<p>{{MeaningLong}}</p>",
);

const CSS: &str = r#"
.card {
    font-size: 13px;
}
.audio {
  text-align: center;
}
.meanings {
    font-size: 16px;
    margin-left: 20px;
}
kanji {
    background-color: pink;
    color: black;
}
vocabulary {
    background-color: purple;
}
"#;

#[derive(Debug, Clone)]
pub struct Deck {
    pub id: i64,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub front: String,
    pub back: String,
}

/// An Anki note type: named fields, card templates and styling.
#[derive(Debug, Clone)]
pub struct Model {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub templates: Vec<Template>,
    pub css: String,
}

pub fn wanikani_deck() -> Deck {
    Deck {
        id: DECK_ID,
        name: DECK_NAME.to_string(),
        description: "Audio to meaning drills for vocabulary from completed WaniKani levels."
            .to_string(),
    }
}

pub fn audio_model() -> Model {
    Model {
        id: MODEL_ID,
        name: MODEL_NAME.to_string(),
        fields: FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
        templates: vec![Template {
            name: "Card 1".to_string(),
            front: FRONT_TEMPLATE.to_string(),
            back: BACK_TEMPLATE.to_string(),
        }],
        css: CSS.to_string(),
    }
}
