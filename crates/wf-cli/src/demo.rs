//! The built-in demo adventure, "The Lighthouse", in English and Spanish.
//!
//! Written through the store ports the same way any authoring tool would.

use wf_core::{
    Adventure, AdventureId, CopyEntry, CopyKey, Language, LanguageCode, Location, Route, Script,
    ScriptId, ScriptInclude,
};
use wf_engine::{Engine, EngineConfig};
use wf_store::{RepoResult, Stores};

/// One piece of copy in both languages.
struct Text {
    key: CopyKey,
    name: &'static str,
    en: &'static str,
    es: &'static str,
}

impl Text {
    fn new(name: &'static str, en: &'static str, es: &'static str) -> Self {
        Self {
            key: CopyKey::new(),
            name,
            en,
            es,
        }
    }
}

/// A fresh engine holding the demo adventure.
pub async fn engine() -> Result<(Engine, AdventureId), String> {
    let stores = Stores::in_memory();
    let es = LanguageCode::parse("es").map_err(|e| e.to_string())?;
    let adventure = seed(&stores, LanguageCode::default(), es)
        .await
        .map_err(|e| format!("failed to load demo adventure: {e}"))?;
    Ok((Engine::with_lua(stores, EngineConfig::default()), adventure))
}

async fn seed(stores: &Stores, en: LanguageCode, es: LanguageCode) -> RepoResult<AdventureId> {
    stores.languages.add(&Language::new("English", en.clone())).await?;
    stores.languages.add(&Language::new("Español", es.clone())).await?;

    let intro = Text::new(
        "intro",
        "The storm has passed. You wake on a cold shore.",
        "La tormenta ha pasado. Despiertas en una playa fría.",
    );
    let shore_first = Text::new(
        "shore-first",
        "Waves hiss over the pebbles. A dark lighthouse stands to the north.",
        "Las olas silban sobre los guijarros. Un faro oscuro se alza al norte.",
    );
    let shore_again = Text::new(
        "shore-again",
        "The shore again. The lighthouse waits.",
        "De nuevo la playa. El faro espera.",
    );
    let hut = Text::new(
        "hut",
        "A fisher's hut, empty and dry.",
        "Una cabaña de pescador, vacía y seca.",
    );
    let lamp = Text::new(
        "lamp",
        "You find an oil lamp and light it.",
        "Encuentras una lámpara de aceite y la enciendes.",
    );
    let climb_lit = Text::new(
        "climb-lit",
        "Your lamp lights the spiral stairs.",
        "Tu lámpara ilumina la escalera de caracol.",
    );
    let climb_dark = Text::new(
        "climb-dark",
        "You stumble up the stairs in the dark.",
        "Subes a tropezones por la escalera a oscuras.",
    );
    let lantern = Text::new(
        "lantern",
        "You light the great lantern. Far out at sea, a ship turns toward home.",
        "Enciendes la gran linterna. A lo lejos, un barco pone rumbo a casa.",
    );
    let farewell = Text::new("farewell", "The light keeps burning.", "La luz sigue ardiendo.");
    let shore_desc = Text::new(
        "shore-desc",
        "A pebbled shore below a lighthouse.",
        "Una playa de guijarros bajo un faro.",
    );
    let hut_desc = Text::new("hut-desc", "A fisher's hut.", "Una cabaña de pescador.");
    let lantern_desc = Text::new("lantern-desc", "The lantern room.", "La sala de la linterna.");
    let east = Text::new("east", "Walk to the hut", "Caminar a la cabaña");
    let west = Text::new("west", "Return to the shore", "Volver a la playa");
    let climb = Text::new("climb", "Climb the lighthouse", "Subir al faro");

    let adventure = Adventure::new("The Lighthouse").with_initial_text(intro.key);
    let id = adventure.id;

    stores.copies.add(&CopyEntry::placeholder(en.clone(), "...")).await?;
    stores.copies.add(&CopyEntry::placeholder(es.clone(), "...")).await?;

    let say = Script::new(id, "say", "function say(key) emitCopy(key) end");
    let visits = Script::new(
        id,
        "visits",
        r#"function visit(place)
  local count = (getState("visits." .. place) or 0) + 1
  setState("visits." .. place, count)
  return count
end"#,
    );
    let enter_shore = Script::new(
        id,
        "enter-shore",
        format!(
            r#"if visit("shore") == 1 then say("{}") else say("{}") end"#,
            shore_first.key, shore_again.key
        ),
    );
    let enter_hut = Script::new(
        id,
        "enter-hut",
        format!(
            r#"say("{}")
if not getState("lamp") then
  setState("lamp", true)
  say("{}")
end"#,
            hut.key, lamp.key
        ),
    );
    let take_stairs = Script::new(
        id,
        "take-stairs",
        format!(
            r#"if getState("lamp") then say("{}") else say("{}") end"#,
            climb_lit.key, climb_dark.key
        ),
    );
    let enter_lantern = Script::new(id, "enter-lantern", format!(r#"say("{}")"#, lantern.key));
    let goodbye = Script::new(id, "goodbye", format!(r#"say("{}")"#, farewell.key));
    for script in [&say, &visits, &enter_shore, &enter_hut, &take_stairs, &enter_lantern, &goodbye] {
        stores.scripts.add(script).await?;
    }

    for text in [
        &intro, &shore_first, &shore_again, &hut, &lamp, &climb_lit, &climb_dark, &lantern,
        &shore_desc, &hut_desc, &lantern_desc, &east, &west, &climb,
    ] {
        add_text(stores, text, id, None, [&en, &es]).await?;
    }
    add_text(stores, &farewell, id, Some(goodbye.id), [&en, &es]).await?;

    let includes = [
        ScriptInclude::new(visits.id, say.id, 0),
        ScriptInclude::new(enter_shore.id, say.id, 0),
        ScriptInclude::new(enter_shore.id, visits.id, 1),
        ScriptInclude::new(enter_hut.id, say.id, 0),
        ScriptInclude::new(take_stairs.id, say.id, 0),
        ScriptInclude::new(enter_lantern.id, say.id, 0),
        ScriptInclude::new(goodbye.id, say.id, 0),
    ];
    for include in &includes {
        stores.includes.add(include).await?;
    }

    let shore = Location::new(id, "Shore")
        .initial()
        .with_description(shore_desc.key)
        .with_enter_script(enter_shore.id);
    let fisher_hut = Location::new(id, "Hut")
        .with_description(hut_desc.key)
        .with_enter_script(enter_hut.id);
    let lantern_room = Location::new(id, "Lantern room")
        .final_location()
        .with_description(lantern_desc.key)
        .with_enter_script(enter_lantern.id);
    for location in [&shore, &fisher_hut, &lantern_room] {
        stores.locations.add(location).await?;
    }

    let routes = [
        Route::new(shore.id, fisher_hut.id, "east").with_label(east.key),
        Route::new(fisher_hut.id, shore.id, "west").with_label(west.key),
        Route::new(shore.id, lantern_room.id, "climb")
            .with_label(climb.key)
            .with_script(take_stairs.id),
    ];
    for route in &routes {
        stores.routes.add(route).await?;
    }

    stores
        .adventures
        .add(&adventure.with_termination_script(goodbye.id))
        .await?;
    Ok(id)
}

/// Store both translations of `text`, scoped to the adventure and optionally
/// to the script that owns it.
async fn add_text(
    stores: &Stores,
    text: &Text,
    adventure: AdventureId,
    script: Option<ScriptId>,
    [en, es]: [&LanguageCode; 2],
) -> RepoResult<()> {
    for (language, body) in [(en, text.en), (es, text.es)] {
        let mut entry = CopyEntry::new(text.key, language.clone(), body)
            .with_name(text.name)
            .for_adventure(adventure);
        if let Some(script) = script {
            entry = entry.for_script(script);
        }
        stores.copies.add(&entry).await?;
    }
    Ok(())
}
