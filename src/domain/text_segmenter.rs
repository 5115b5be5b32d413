//! 文本分割器
//!
//! 将待合成文本切成句子，逐句推理后再拼接

/// 默认最小字符数限制（短句会被合并到满足此长度）
pub const DEFAULT_MIN_CHARS: usize = 20;

/// 默认弱分隔符分割阈值
/// 片段长度未达到此值时，逗号等弱分隔符不会触发分割
pub const DEFAULT_WEAK_SPLIT_CHARS: usize = 200;

/// 文本分割配置
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// 最小字符数限制（用于合并短句）
    pub min_chars: usize,
    /// 弱分隔符生效的最小片段长度
    pub weak_split_chars: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            min_chars: DEFAULT_MIN_CHARS,
            weak_split_chars: DEFAULT_WEAK_SPLIT_CHARS,
        }
    }
}

/// 检查是否为强分隔符（句末标点）
#[inline]
fn is_strong_delimiter(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '.' | '?' | '!' | '…')
}

/// 检查是否为弱分隔符（逗号等，达到阈值时才分割）
#[inline]
fn is_weak_delimiter(ch: char) -> bool {
    matches!(ch, '，' | '；' | '：' | ',' | ';' | ':')
}

/// 检查片段是否只包含引号或空白（应该被合并）
#[inline]
fn is_trivial_segment(s: &str) -> bool {
    s.chars().all(|c| {
        matches!(
            c,
            '"' | '\u{201C}' | '\u{201D}' | '\'' | '\u{2018}' | '\u{2019}' | ')' | ' ' | '\t'
        )
    })
}

/// 按分隔符分割单行文本（不做合并）
///
/// ASCII 句点只有后面跟空白或行尾时才算句末，避免切开 `3.14` 这类内容
fn split_by_delimiters(text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut char_count = 0;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        char_count += 1;

        let next_is_boundary = chars.peek().map_or(true, |next| next.is_whitespace());

        let should_split = if is_strong_delimiter(ch) {
            ch != '.' || next_is_boundary
        } else {
            is_weak_delimiter(ch) && next_is_boundary && char_count >= config.weak_split_chars
        };

        if should_split {
            // 连续的句末标点（"?!"、"..."）留在同一片段
            if chars.peek().map_or(false, |next| is_strong_delimiter(*next)) {
                continue;
            }
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                segments.push(trimmed.to_string());
            }
            current.clear();
            char_count = 0;
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        segments.push(trimmed.to_string());
    }

    segments
}

/// 合并短片段直到满足 min_chars
fn merge_until_min_chars(segments: Vec<String>, min_chars: usize) -> Vec<String> {
    if segments.is_empty() {
        return segments;
    }

    let mut result: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for seg in segments {
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(&seg);

        if buffer.chars().count() >= min_chars {
            result.push(std::mem::take(&mut buffer));
        }
    }

    if !buffer.is_empty() {
        if let Some(last) = result.last_mut() {
            last.push(' ');
            last.push_str(&buffer);
        } else {
            result.push(buffer);
        }
    }

    result
}

/// 对文本进行分段
///
/// 分段策略：
/// 1. 按行分割，跨行不合并
/// 2. 每行按标点分割，行内合并短句
/// 3. 只有引号的片段并入前一个片段
pub fn segment_text(text: &str, config: &SegmentConfig) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|s| !s.is_empty()) {
        let sentences = merge_until_min_chars(split_by_delimiters(line, config), config.min_chars);
        for sentence in sentences {
            if is_trivial_segment(&sentence) {
                if let Some(last) = segments.last_mut() {
                    last.push_str(&sentence);
                }
                continue;
            }
            segments.push(sentence);
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_merge() -> SegmentConfig {
        SegmentConfig {
            min_chars: 0,
            weak_split_chars: DEFAULT_WEAK_SPLIT_CHARS,
        }
    }

    #[test]
    fn test_strong_delimiters_split() {
        let segments = segment_text("Hello there. How are you? Fine!", &no_merge());
        assert_eq!(segments, vec!["Hello there.", "How are you?", "Fine!"]);
    }

    #[test]
    fn test_decimal_point_does_not_split() {
        let segments = segment_text("Pi is 3.14 roughly. Yes.", &no_merge());
        assert_eq!(segments, vec!["Pi is 3.14 roughly.", "Yes."]);
    }

    #[test]
    fn test_repeated_punctuation_stays_together() {
        let segments = segment_text("Really?! Wait...  Okay.", &no_merge());
        assert_eq!(segments, vec!["Really?!", "Wait...", "Okay."]);
    }

    #[test]
    fn test_short_sentences_merged_within_line() {
        let config = SegmentConfig {
            min_chars: 20,
            weak_split_chars: DEFAULT_WEAK_SPLIT_CHARS,
        };
        let segments = segment_text("Hi. Yes. This is a longer sentence.", &config);
        assert_eq!(segments, vec!["Hi. Yes. This is a longer sentence."]);
    }

    #[test]
    fn test_lines_are_not_merged() {
        let config = SegmentConfig {
            min_chars: 50,
            weak_split_chars: DEFAULT_WEAK_SPLIT_CHARS,
        };
        let segments = segment_text("First line.\r\nSecond line.", &config);
        assert_eq!(segments, vec!["First line.", "Second line."]);
    }

    #[test]
    fn test_weak_delimiter_respects_threshold() {
        let config = SegmentConfig {
            min_chars: 0,
            weak_split_chars: 10,
        };
        let segments = segment_text("A fairly long clause, then another one.", &config);
        assert_eq!(segments, vec!["A fairly long clause,", "then another one."]);

        let segments = segment_text("Short, then another one.", &no_merge());
        assert_eq!(segments, vec!["Short, then another one."]);
    }

    #[test]
    fn test_quote_only_segment_merged() {
        let segments = segment_text("He said hello.\n\"\nThen left.", &no_merge());
        assert_eq!(segments.len(), 2);
        assert!(segments[0].ends_with('"'));
    }

    #[test]
    fn test_chinese_punctuation() {
        let segments = segment_text("你好。今天天气不错！", &no_merge());
        assert_eq!(segments, vec!["你好。", "今天天气不错！"]);
    }

    #[test]
    fn test_blank_input() {
        assert!(segment_text("   \n\t", &SegmentConfig::default()).is_empty());
    }

    #[test]
    fn test_trivial_segment_detection() {
        assert!(is_trivial_segment("\""));
        assert!(is_trivial_segment("\" "));
        assert!(!is_trivial_segment("word"));
    }
}
