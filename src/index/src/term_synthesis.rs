// Copyright 2026 The TagDex Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Turns upstream rows into the terms the index is built from: username,
//! flag, quality, date and score-bin labels for posts; normalized,
//! tokenized words for tags.

use chrono::{Datelike, TimeZone, Utc};

use crate::upstream::PostInfo;

const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// FNV-1a-32 over the normalized UTF-8 bytes of `term`. The reserved
/// `__all` term is never hashed through here; callers special-case it to
/// key 0.
pub fn hash_word(term: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in term.as_bytes() {
        hash ^= *byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Folds diacritics the way the corpus it was trained on writes German
/// text (`ä`→`ae`, ..., `ß`→`ss`), turns `-` into a space, lowercases, and
/// keeps only `[a-z0-9 ]`.
pub fn clean_string(input: &str) -> String {
    let folded = input
        .replace('ä', "ae")
        .replace('ü', "ue")
        .replace('ö', "oe")
        .replace('ß', "ss")
        .replace('-', " ");

    folded
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect()
}

/// Splits `tag` on whitespace after normalizing, deduplicating the
/// resulting words while preserving first-seen order.
pub fn extract_words(tag: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut words = Vec::new();
    for word in clean_string(tag).split_whitespace() {
        if seen.insert(word.to_string()) {
            words.push(word.to_string());
        }
    }
    words
}

/// All terms derived from a post, independent of its tags. `item_id` is
/// always `-post.id`, matching the store's internal negated-id convention.
pub fn post_terms(post: &PostInfo) -> Vec<String> {
    let mut terms = vec![format!("u:{}", clean_string(&post.username))];

    match post.flags.trailing_zeros() {
        0 => terms.push("f:sfw".to_string()),
        1 => terms.push("f:nsfw".to_string()),
        2 => terms.push("f:nsfl".to_string()),
        3 => terms.push("f:nsfp".to_string()),
        _ => {}
    }

    if post.promoted {
        terms.push("f:top".to_string());
    }
    if post.has_text {
        terms.push("f:text".to_string());
    }
    if post.has_audio {
        terms.push("f:sound".to_string());
    }
    if post.is_controversial {
        terms.push("f:controversial".to_string());
    }

    match post.mark {
        6 => terms.push("m:ftb".to_string()),
        1 => terms.push("m:newfag".to_string()),
        _ => {}
    }

    terms.extend(quality_terms(post.width).into_iter().map(str::to_string));

    let created = Utc.timestamp_opt(post.created, 0).single().unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
    terms.push(format!("d:{:04}", created.year()));
    terms.push(format!("d:{:04}:{:02}", created.year(), created.month()));

    for bin in 1..=(post.score / 100).max(0) {
        terms.push(format!("s:{}", 100 * bin));
    }
    if post.score < -300 {
        terms.push("s:shit".to_string());
    }

    terms
}

pub fn quality_terms(width: i32) -> Vec<&'static str> {
    if width > 3800 {
        vec!["q:2160p", "q:4k"]
    } else if width > 1900 {
        vec!["q:1080p", "q:hd"]
    } else if width > 1200 {
        vec!["q:720p", "q:hd"]
    } else if width > 600 {
        vec!["q:sd"]
    } else {
        vec!["q:kartoffel"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(overrides: impl FnOnce(&mut PostInfo)) -> PostInfo {
        let mut p = PostInfo {
            id: 1,
            updated: 0,
            flags: 1,
            created: 1_700_000_000,
            has_audio: false,
            width: 1000,
            mark: 0,
            score: 0,
            promoted: false,
            username: "Alice".to_string(),
            has_text: false,
            is_controversial: false,
        };
        overrides(&mut p);
        p
    }

    #[test]
    fn hash_word_is_fnv1a_32() {
        assert_eq!(hash_word(""), FNV_OFFSET_BASIS);
        assert_eq!(hash_word("a"), (FNV_OFFSET_BASIS ^ b'a' as u32).wrapping_mul(FNV_PRIME));
        // Differs for differently-cased input: callers normalize before hashing.
        assert_ne!(hash_word("cat"), hash_word("Cat"));
    }

    #[test]
    fn clean_string_folds_diacritics_and_filters() {
        assert_eq!(clean_string("Müller-Lüdenscheidt!"), "mueller luedenscheidt");
        assert_eq!(clean_string("Straße 12"), "strasse 12");
    }

    #[test]
    fn extract_words_dedupes_preserving_order() {
        assert_eq!(extract_words("cat cat dog"), vec!["cat", "dog"]);
    }

    #[test]
    fn post_terms_username_is_normalized() {
        let p = post(|p| p.username = "Müller".to_string());
        assert!(post_terms(&p).contains(&"u:mueller".to_string()));
    }

    #[test]
    fn post_terms_flag_is_lowest_set_bit() {
        let p = post(|p| p.flags = 0b0110);
        assert!(post_terms(&p).contains(&"f:nsfw".to_string()));
        assert!(!post_terms(&p).contains(&"f:nsfl".to_string()));
    }

    #[test]
    fn post_terms_marks() {
        let p = post(|p| p.mark = 6);
        assert!(post_terms(&p).contains(&"m:ftb".to_string()));

        let p = post(|p| p.mark = 1);
        assert!(post_terms(&p).contains(&"m:newfag".to_string()));
    }

    #[test]
    fn post_terms_quality_by_width() {
        assert_eq!(quality_terms(4000), vec!["q:2160p", "q:4k"]);
        assert_eq!(quality_terms(2000), vec!["q:1080p", "q:hd"]);
        assert_eq!(quality_terms(1300), vec!["q:720p", "q:hd"]);
        assert_eq!(quality_terms(700), vec!["q:sd"]);
        assert_eq!(quality_terms(200), vec!["q:kartoffel"]);
    }

    #[test]
    fn post_terms_score_bins() {
        let p = post(|p| p.score = 250);
        let terms = post_terms(&p);
        assert!(terms.contains(&"s:100".to_string()));
        assert!(terms.contains(&"s:200".to_string()));
        assert!(!terms.contains(&"s:300".to_string()));
    }

    #[test]
    fn post_terms_shit_label() {
        let p = post(|p| p.score = -500);
        assert!(post_terms(&p).contains(&"s:shit".to_string()));
    }

    #[test]
    fn post_terms_date_labels() {
        // 1_700_000_000 is 2023-11-14T22:13:20Z.
        let p = post(|_| {});
        let terms = post_terms(&p);
        assert!(terms.contains(&"d:2023".to_string()));
        assert!(terms.contains(&"d:2023:11".to_string()));
    }
}
