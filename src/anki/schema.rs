//! Legacy (schema 11) Anki collection layout, the format `.apkg` importers
//! accept from `collection.anki2`.

use serde_json::{
    json,
    Map,
    Value,
};

use super::model::{
    Deck,
    Model,
};

pub const SCHEMA_VERSION: i64 = 11;

pub const SCHEMA: &str = r#"
CREATE TABLE col (
    id              integer primary key,
    crt             integer not null,
    mod             integer not null,
    scm             integer not null,
    ver             integer not null,
    dty             integer not null,
    usn             integer not null,
    ls              integer not null,
    conf            text not null,
    models          text not null,
    decks           text not null,
    dconf           text not null,
    tags            text not null
);
CREATE TABLE notes (
    id              integer primary key,
    guid            text not null,
    mid             integer not null,
    mod             integer not null,
    usn             integer not null,
    tags            text not null,
    flds            text not null,
    sfld            integer not null,
    csum            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE cards (
    id              integer primary key,
    nid             integer not null,
    did             integer not null,
    ord             integer not null,
    mod             integer not null,
    usn             integer not null,
    type            integer not null,
    queue           integer not null,
    due             integer not null,
    ivl             integer not null,
    factor          integer not null,
    reps            integer not null,
    lapses          integer not null,
    left            integer not null,
    odue            integer not null,
    odid            integer not null,
    flags           integer not null,
    data            text not null
);
CREATE TABLE revlog (
    id              integer primary key,
    cid             integer not null,
    usn             integer not null,
    ease            integer not null,
    ivl             integer not null,
    lastIvl         integer not null,
    factor          integer not null,
    time            integer not null,
    type            integer not null
);
CREATE TABLE graves (
    usn             integer not null,
    oid             integer not null,
    type            integer not null
);
CREATE INDEX ix_notes_usn on notes (usn);
CREATE INDEX ix_cards_usn on cards (usn);
CREATE INDEX ix_revlog_usn on revlog (usn);
CREATE INDEX ix_cards_nid on cards (nid);
CREATE INDEX ix_cards_sched on cards (did, queue, due);
CREATE INDEX ix_revlog_cid on revlog (cid);
CREATE INDEX ix_notes_csum on notes (csum);
"#;

const DEFAULT_DECK_ID: i64 = 1;
const DEFAULT_CONF_ID: i64 = 1;

pub fn collection_conf(model: &Model, deck: &Deck) -> Value {
    json!({
        "activeDecks": [deck.id],
        "addToCur": true,
        "collapseTime": 1200,
        "curDeck": deck.id,
        "curModel": model.id.to_string(),
        "dueCounts": true,
        "estTimes": true,
        "newBury": true,
        "newSpread": 0,
        "nextPos": 1,
        "sortBackwards": false,
        "sortType": "noteFld",
        "timeLim": 0
    })
}

pub fn models_json(model: &Model, deck: &Deck, modified: i64) -> Value {
    let fields: Vec<Value> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "font": "Liberation Sans",
                "media": [],
                "rtl": false,
                "size": 20,
                "sticky": false
            })
        })
        .collect();

    let templates: Vec<Value> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, tmpl)| {
            json!({
                "name": tmpl.name,
                "ord": ord,
                "qfmt": tmpl.front,
                "afmt": tmpl.back,
                "bqfmt": "",
                "bafmt": "",
                "did": null
            })
        })
        .collect();

    // Every template needs the first field (the audio) to produce a card.
    let req: Vec<Value> = (0..model.templates.len()).map(|ord| json!([ord, "all", [0]])).collect();

    keyed(
        model.id,
        json!({
            "id": model.id,
            "name": model.name,
            "type": 0,
            "mod": modified,
            "usn": -1,
            "sortf": 0,
            "did": deck.id,
            "tmpls": templates,
            "flds": fields,
            "css": model.css,
            "latexPre": "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n",
            "latexPost": "\\end{document}",
            "req": req,
            "tags": [],
            "vers": []
        }),
    )
}

pub fn decks_json(deck: &Deck, modified: i64) -> Value {
    let mut decks = Map::new();
    decks.insert(DEFAULT_DECK_ID.to_string(), deck_entry(DEFAULT_DECK_ID, "Default", "", 0));
    decks.insert(deck.id.to_string(), deck_entry(deck.id, &deck.name, &deck.description, modified));
    Value::Object(decks)
}

pub fn deck_conf_json() -> Value {
    keyed(
        DEFAULT_CONF_ID,
        json!({
            "id": DEFAULT_CONF_ID,
            "name": "Default",
            "autoplay": true,
            "maxTaken": 60,
            "mod": 0,
            "usn": 0,
            "replayq": true,
            "timer": 0,
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0
            },
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100
            }
        }),
    )
}

fn deck_entry(id: i64, name: &str, description: &str, modified: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "desc": description,
        "mod": modified,
        "usn": -1,
        "conf": DEFAULT_CONF_ID,
        "dyn": 0,
        "collapsed": false,
        "extendNew": 10,
        "extendRev": 50,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0]
    })
}

fn keyed(id: i64, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(id.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anki::model::{
        audio_model,
        wanikani_deck,
        DECK_ID,
        MODEL_ID,
    };

    #[test]
    fn test_models_json_shape() {
        let models = models_json(&audio_model(), &wanikani_deck(), 42);
        let model = &models[MODEL_ID.to_string()];

        assert_eq!(model["name"], "WaniVocab Audio Model");
        assert_eq!(model["did"], DECK_ID);
        assert_eq!(model["flds"].as_array().unwrap().len(), 5);
        assert_eq!(model["flds"][3]["name"], "Meanings");
        assert_eq!(model["flds"][3]["ord"], 3);
        assert_eq!(model["tmpls"][0]["qfmt"], r#"<div class="audio">{{Audio}}</div>"#);
        assert_eq!(model["req"], json!([[0, "all", [0]]]));
    }

    #[test]
    fn test_decks_json_contains_default_and_target_deck() {
        let decks = decks_json(&wanikani_deck(), 42);
        assert_eq!(decks["1"]["name"], "Default");
        assert_eq!(decks[DECK_ID.to_string()]["name"], "WaniKani Audio Cards");
        assert_eq!(decks[DECK_ID.to_string()]["conf"], 1);
    }
}
