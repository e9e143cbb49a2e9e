use super::{CommandContext, Effect, Response};
use crate::{
    ajo::{Ajo, Status},
    languages::{self, Language},
    responses, Error,
};

/// Commands under this many characters also look at the parent comment
/// for language names.
const SHORT_COMMAND_LEN: usize = 12;

/// Apply a language argument: a single language, or `a+b+c` for several.
/// Returns the parts of `a+b+c` that weren't recognized and got skipped.
fn apply_language(ajo: &mut Ajo, argument: &str, identified: bool) -> Result<Vec<String>, Error> {
    if argument.contains('+') {
        let mut found: Vec<Language> = Vec::new();
        let mut skipped = Vec::new();
        for part in argument.split('+').filter(|x| !x.trim().is_empty()) {
            match languages::convert(part) {
                Some(conversion) => found.push(conversion.language),
                None => skipped.push(part.trim().to_string()),
            }
        }
        if !ajo.set_defined_multiple(found) {
            return Err(Error::LanguageUnrecognized(argument.to_string()));
        }
        ajo.is_identified = identified;
        return Ok(skipped);
    }

    // Four letters that aren't a language are a script.
    if argument.len() == 4 && languages::by_name(argument).is_none() {
        if let Some(script) = languages::script(argument) {
            ajo.set_script(script);
            return Ok(Vec::new());
        }
    }

    let conversion = languages::convert(argument)
        .ok_or_else(|| Error::LanguageUnrecognized(argument.to_string()))?;
    ajo.set_language(conversion, identified);
    Ok(Vec::new())
}

fn skipped_reply(skipped: &[String]) -> Response {
    match skipped.is_empty() {
        true => Response::default(),
        false => Response::reply(responses::skipped_languages(skipped)),
    }
}

pub(super) fn identify(ajo: &mut Ajo, argument: &str, advanced: bool) -> Result<Response, Error> {
    if !advanced {
        let skipped = apply_language(ajo, argument, true)?;
        return Ok(skipped_reply(&skipped));
    }

    match argument.len() {
        3 => {
            let language = languages::by_code(argument)
                .ok_or_else(|| Error::LanguageUnrecognized(argument.to_string()))?;
            ajo.set_language(
                languages::Conversion {
                    language,
                    country_code: None,
                    script: None,
                },
                true,
            );
            Ok(Response::default())
        }
        4 => match languages::script(argument) {
            Some(script) => {
                ajo.set_script(script);
                Ok(Response::default())
            }
            None => Ok(Response::reply(responses::invalid_script(argument))),
        },
        _ => Ok(Response::reply(responses::advanced_identify_error())),
    }
}

pub(super) fn set(
    ajo: &mut Ajo,
    argument: &str,
    reset_status: bool,
    context: &CommandContext,
) -> Result<Response, Error> {
    if !context.is_moderator {
        return Ok(Response::default());
    }
    let skipped = apply_language(ajo, argument, false)?;
    if reset_status {
        ajo.set_status(Status::Untranslated, context.now);
    }
    Ok(skipped_reply(&skipped))
}

pub(super) fn reset(ajo: &mut Ajo, context: &CommandContext) -> Response {
    if context.is_moderator || context.is_op(ajo) {
        ajo.reset();
    }
    Response::default()
}

pub(super) fn long(ajo: &mut Ajo, context: &CommandContext) -> Response {
    if context.is_moderator {
        ajo.is_long = !ajo.is_long;
    }
    Response::default()
}

/// Set a status on the whole request, or on the languages mentioned in
/// the comment for defined multiples. Returns whether anything changed.
fn mark(ajo: &mut Ajo, status: Status, context: &CommandContext) -> bool {
    if ajo.status().is_some() {
        return ajo.set_status(status, context.now);
    }

    let mut text = context.body.to_string();
    if context.body.trim().chars().count() < SHORT_COMMAND_LEN {
        if let Some(parent) = context.parent {
            text.push('\n');
            text.push_str(&parent.body);
        }
    }
    let mut changed = false;
    for language in languages::mentioned_languages(&text) {
        changed |= ajo.set_status_for(&language, status, context.now);
    }
    changed
}

pub(super) fn missing(ajo: &mut Ajo, context: &CommandContext) -> Response {
    if ajo.status() == Some(Status::Translated) || !mark(ajo, Status::Missing, context) {
        return Response::default();
    }
    Response {
        effects: vec![Effect::MessageUser {
            to: ajo.author.clone(),
            subject: responses::MISSING_SUBJECT.to_string(),
            body: responses::missing_message(&ajo.author, &ajo.title, context.permalink),
        }],
        ..Default::default()
    }
}

pub(super) fn claim(ajo: &mut Ajo, context: &CommandContext) -> Response {
    let Some(single) = ajo.single() else {
        return Response::default();
    };
    if matches!(single.status, Status::Translated | Status::Doublecheck) {
        return Response::default();
    }

    if let Some(current) = ajo.claim() {
        let lapsed = context.now - current.claimed_at >= context.claim_expiry_secs;
        if !lapsed {
            if current.username.eq_ignore_ascii_case(context.author) {
                return Response::default();
            }
            return Response::reply(responses::already_claimed(&current.username));
        }
    }

    ajo.set_claim(context.author, context.now);
    Response::reply(responses::claimed(
        context.author,
        ajo.language_name(),
        context.claim_expiry_secs / 3600,
    ))
}

pub(super) fn doublecheck(ajo: &mut Ajo, context: &CommandContext) -> Response {
    if ajo.status() != Some(Status::Translated) {
        mark(ajo, Status::Doublecheck, context);
    }
    Response::default()
}

pub(super) fn translated(ajo: &mut Ajo, context: &CommandContext) -> Response {
    if !mark(ajo, Status::Translated, context) {
        return Response::default();
    }
    if !ajo.is_translated() || ajo.author_messaged || context.is_op(ajo) {
        return Response::default();
    }

    ajo.author_messaged = true;
    Response {
        effects: vec![Effect::MessageUser {
            to: ajo.author.clone(),
            subject: responses::TRANSLATED_SUBJECT.to_string(),
            body: responses::translated_message(&ajo.author, &ajo.title, context.permalink),
        }],
        ..Default::default()
    }
}

pub(super) fn delete(ajo: &Ajo, context: &CommandContext) -> Response {
    if !ajo.is_bot_crosspost || !(context.is_moderator || context.is_op(ajo)) {
        return Response::default();
    }
    log::info!("u/{} asked to remove crosspost {}", context.author, ajo.id());
    Response {
        effects: vec![Effect::RemovePost],
        ..Default::default()
    }
}

pub(super) fn reference(argument: &str) -> Response {
    match languages::convert(argument) {
        Some(conversion) if !conversion.language.is_unknown() => {
            Response::reply(responses::reference_card(&conversion.language))
        }
        _ => Response::reply(responses::invalid_reference(argument)),
    }
}

pub(super) fn short_thanks(ajo: &mut Ajo, context: &CommandContext) -> Response {
    let qualifies = context.is_op(ajo)
        && !ajo.is_identified
        && ajo.single().is_some_and(|x| {
            x.status == Status::Untranslated && !x.language.is_generic()
        });
    if qualifies {
        ajo.set_status(Status::Translated, context.now);
    }
    Response::default()
}
