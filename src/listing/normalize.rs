//! テキスト正規化
//!
//! 給与欄はカスタムフォントで数字を私用領域の文字に置き換えて表示されているため、
//! そのままでは読めない。固定の対応表で ASCII 数字に戻す。

/// 私用領域コードポイント → 数字 の対応表（サイトのフォント定義そのまま）
///
/// 9 は U+E03A ではなく U+E040。
pub const OBFUSCATED_DIGITS: [(char, char); 10] = [
    ('\u{e031}', '0'),
    ('\u{e032}', '1'),
    ('\u{e033}', '2'),
    ('\u{e034}', '3'),
    ('\u{e035}', '4'),
    ('\u{e036}', '5'),
    ('\u{e037}', '6'),
    ('\u{e038}', '7'),
    ('\u{e039}', '8'),
    ('\u{e040}', '9'),
];

fn decode_digit(c: char) -> Option<char> {
    OBFUSCATED_DIGITS
        .iter()
        .find(|(code, _)| *code == c)
        .map(|(_, digit)| *digit)
}

/// 難読化された給与文字列を ASCII 数字に戻す
pub fn decode_salary_digits(text: &str) -> String {
    if !text.chars().any(|c| decode_digit(c).is_some()) {
        return text.to_string();
    }
    text.chars().map(|c| decode_digit(c).unwrap_or(c)).collect()
}

/// 前後の空白を除去し、連続する空白を1つにまとめる
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_digits_in_order() {
        let encoded: String = OBFUSCATED_DIGITS.iter().map(|(code, _)| *code).collect();
        assert_eq!(decode_salary_digits(&encoded), "0123456789");
    }

    #[test]
    fn test_identity_without_mapped_code_points() {
        for s in ["", "15-25K·13薪", "面议", "\u{e03a}\u{e030}"] {
            assert_eq!(decode_salary_digits(s), s);
        }
    }

    #[test]
    fn test_mixed_salary() {
        let salary = "\u{e032}\u{e036}-\u{e033}\u{e036}K·\u{e032}\u{e034}薪";
        assert_eq!(decode_salary_digits(salary), "15-25K·13薪");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Rust \t  Engineer\n"), "Rust Engineer");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text("北京·海淀区"), "北京·海淀区");
    }
}
