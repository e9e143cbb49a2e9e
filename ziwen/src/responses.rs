//! Everything the bots say. Replies are Markdown.

use crate::languages::Language;

pub const FOOTER: &str = "\n\n---\n^(Ziwen: a bot for r/translator. Replies from this account are automatic.)";

/// Append the footer to a reply.
pub fn with_footer(text: &str) -> String {
    format!("{text}{FOOTER}")
}

pub fn claimed(username: &str, language: &str, expiry_hours: i64) -> String {
    with_footer(&format!(
        "**u/{username}** is now working on this {language} request. \
         The claim lapses after {expiry_hours} hours if the post isn't marked as translated."
    ))
}

pub fn already_claimed(claimer: &str) -> String {
    with_footer(&format!(
        "This request is already being worked on by **u/{claimer}**. \
         Please wait for them to finish or for the claim to lapse."
    ))
}

pub fn invalid_language(input: &str) -> String {
    with_footer(&format!(
        "Sorry, `{input}` isn't a language code or name I recognize. \
         Try the full English name of the language, or an ISO 639 code."
    ))
}

pub fn skipped_languages(skipped: &[String]) -> String {
    let list: Vec<String> = skipped.iter().map(|x| format!("`{x}`")).collect();
    with_footer(&format!(
        "I set the languages I recognized, but skipped {} since I don't know them.",
        list.join(", ")
    ))
}

pub fn advanced_identify_error() -> String {
    with_footer(
        "Advanced identification (`!identify:xxx!`) only accepts three-letter ISO 639-3 \
         language codes and four-letter ISO 15924 script codes.",
    )
}

pub fn invalid_script(code: &str) -> String {
    with_footer(&format!(
        "Sorry, `{code}` isn't an ISO 15924 script code I recognize."
    ))
}

pub fn reference_card(language: &Language) -> String {
    let mut text = format!("## {}\n\n", language.name);
    if let Some(code_1) = &language.code_1 {
        text.push_str(&format!("* **ISO 639-1:** `{code_1}`\n"));
    }
    text.push_str(&format!("* **ISO 639-3:** `{}`\n", language.code_3));
    text.push_str(&format!(
        "* **Requests on r/translator:** {}",
        match language.supported {
            true => "has its own flair",
            false => "listed under the generic flair",
        }
    ));
    with_footer(&text)
}

pub fn invalid_reference(input: &str) -> String {
    with_footer(&format!("There is no reference information for `{input}`."))
}

pub const TRANSLATED_SUBJECT: &str = "[Notification] Your request has been translated on r/translator!";

pub fn translated_message(author: &str, title: &str, permalink: &str) -> String {
    with_footer(&format!(
        "Hi u/{author},\n\nyour request [\"{title}\"]({permalink}) has been marked as translated. \
         If the translation helped, consider thanking the translator in the thread."
    ))
}

pub const MISSING_SUBJECT: &str = "[Notification] Your request on r/translator is missing something";

pub fn missing_message(author: &str, title: &str, permalink: &str) -> String {
    with_footer(&format!(
        "Hi u/{author},\n\nyour request [\"{title}\"]({permalink}) seems to be missing the text, \
         image or audio to translate. Please add a link to it or the request may be removed."
    ))
}

pub fn crosspost_note(original_author: &str, subreddit: &str, comment_link: &str, requester: &str) -> String {
    with_footer(&format!(
        "This request was originally posted by u/{original_author} on r/{subreddit}. \
         u/{requester} asked for it to be [brought here]({comment_link})."
    ))
}

pub fn crosspost_confirmation(language: &str, link: &str) -> String {
    with_footer(&format!(
        "Thank you! This has been [crossposted to r/translator]({link}) as a {language} request."
    ))
}

pub fn already_crossposted(link: &str) -> String {
    with_footer(&format!(
        "This has [already been crossposted]({link}) to r/translator."
    ))
}

pub fn english_only() -> String {
    with_footer(
        "It looks like this is already in English, so it wasn't crossposted. \
         Use `!translate:language` to name the language if that's wrong.",
    )
}

pub fn wrong_subreddit() -> String {
    with_footer(
        "r/translate is closed. Translation requests go to **r/translator** instead.",
    )
}
