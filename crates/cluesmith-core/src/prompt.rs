//! Instruction text sent to the provider.
//!
//! Any wording change here must come with a new prompt version tag, otherwise
//! cached content produced by the old wording is served under the new one.

use crate::model::ClueRecord;

pub const HINT_SYSTEM_PROMPT: &str = "You are an expert cryptic crossword setter and teacher who gives precise, \
non-spoiler guidance. You are given a clue and, for validation only, its true answer. Write exactly three \
concise hints that never reveal the answer. Each hint covers ONE helpful aspect and starts with one of these \
labels: 'Indicator:', 'Fodder:', 'Definition:', 'Device:', 'Structure:', 'Surface:', 'Grammar:', 'Link:', \
'Position:'. \
Indicator: name the exact word(s) signalling the device (e.g. broken, wild, inside, back, heard). \
Fodder: name the exact letters or word(s) being manipulated, or 'N/A' when there are none. \
Definition: name the exact definition word(s); for an &lit write 'Definition: entire clue (&lit)'. \
Device: state the clue type (anagram, container, hidden, reversal, homophone, deletion, insertion, \
initials/ends, charade, double definition, &lit). \
Structure/Position/Link/Grammar/Surface: point at helpful structure such as joiners, link words, \
enumeration, reversal direction cues or punctuation tricks. \
Always quote the exact clue token(s) for the chosen aspect and avoid repeating an aspect unless the clue \
strongly warrants it. Keep each hint under 160 characters. Never output or spell the answer. \
Output strictly a JSON array of three strings and nothing else.";

pub const EXPLANATION_SYSTEM_PROMPT: &str = "You are an expert cryptic crossword setter and teacher. Give a \
clear, numbered explanation of one clue containing (1) the device name (anagram/container/hidden/reversal/\
homophone/deletion/insertion/initials/charade/double definition/&lit), (2) 3-6 numbered steps citing the \
exact clue word(s) for each role, and (3) a highlight map. In the steps state the indicator token(s), the \
fodder token(s) if any, the definition token(s), and any substitutions or abbreviations (e.g. 'way' => 'ST'). \
Every step begins with '1.', '2.' and so on. Name parts using clue tokens only, with a brief parenthetical \
rationale (e.g. \"Indicator: 'broken' (anagram cue)\"). \
Output strictly a JSON object with keys 'device' (string), 'steps' (array of strings) and 'highlights' \
(array of {role: 'indicator|fodder|definition', text: 'exact tokens from clue'}). \
Never reveal or spell the answer.";

/// Appended to the hint instruction after a rejected response.
pub const HINT_REINFORCEMENT: &str = "IMPORTANT: Output ONLY a JSON array of exactly three string hints. \
Do not include any other text.";

/// Appended to the explanation instruction after a rejected response.
pub const EXPLANATION_REINFORCEMENT: &str = "IMPORTANT: Do NOT reveal or spell the answer in any step or \
highlight. Use only clue tokens; keep steps generic. Return ONLY a JSON object.";

fn clue_preamble(record: &ClueRecord) -> String {
    let mut out = format!("Clue: {}", record.clue.trim());
    if let Some(direction) = record.direction.as_str() {
        out.push_str("\nDirection: ");
        out.push_str(direction);
    }
    out.push_str("\nAnswer length: ");
    out.push_str(&record.length.to_string());
    out
}

pub fn hint_user_prompt(record: &ClueRecord) -> String {
    format!(
        "{}\nYou know the answer is '{}' but you must not reveal, spell, or anagram this string in any hint.\n\
         Produce three hints. Each hint must start with exactly one label from: Indicator, Fodder, Definition, \
         Device, Structure, Surface, Grammar, Link, Position.\n\
         Name the exact clue tokens for the chosen aspect. If fodder is not applicable, choose a different \
         aspect. Do not repeat aspects unless helpful.\n\
         Return only a JSON array of exactly three strings.",
        clue_preamble(record),
        record.answer.trim()
    )
}

pub fn explanation_user_prompt(record: &ClueRecord) -> String {
    format!(
        "{}\nYou know the answer is '{}' but you must not reveal, spell, or anagram this string in any \
         explanation.\n\
         Return only JSON with: device; steps as 3-6 numbered strings citing exact tokens plus roles \
         (indicator/fodder/definition) and any substitutions; highlights array marking tokens by role.",
        clue_preamble(record),
        record.answer.trim()
    )
}

/// The instruction for the next attempt after a rejected response.
pub fn reinforce(previous: &str, directive: &str) -> String {
    format!("{previous}\n{directive}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Direction, Enumeration};

    #[test]
    fn direction_line_only_when_known() {
        let rec = ClueRecord::new("1", " Mammal broken otter ", "OTTER");
        let prompt = hint_user_prompt(&rec);
        assert!(prompt.starts_with("Clue: Mammal broken otter\nAnswer length: 5\n"));
        assert!(!prompt.contains("Direction:"));

        let rec = rec.with_direction(Direction::Down);
        assert!(hint_user_prompt(&rec).contains("\nDirection: down\n"));
    }

    #[test]
    fn pattern_enumeration_is_verbatim() {
        let mut rec = ClueRecord::new("1", "clue", "ICE AGE");
        rec.length = Enumeration::Pattern("3,3".into());
        assert!(explanation_user_prompt(&rec).contains("Answer length: 3,3\n"));
    }

    #[test]
    fn reinforcement_appends_directive() {
        let next = reinforce("base", HINT_REINFORCEMENT);
        assert!(next.starts_with("base\n"));
        assert!(next.ends_with(HINT_REINFORCEMENT));
    }
}
