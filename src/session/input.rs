/// Longest answer a cell accepts. 24 x 24 = 576, so four digits leaves room.
pub const MAX_ANSWER_DIGITS: u32 = 4;

/// Append a typed digit to an answer. Non-digits are ignored.
pub fn push_digit(answer: Option<u32>, ch: char) -> Option<u32> {
    let Some(digit) = ch.to_digit(10) else {
        return answer;
    };
    match answer {
        None => Some(digit),
        Some(current) if digit_count(current) >= MAX_ANSWER_DIGITS => Some(current),
        Some(current) => Some(current * 10 + digit),
    }
}

/// Drop the last digit; removing the only digit unsets the answer.
pub fn pop_digit(answer: Option<u32>) -> Option<u32> {
    match answer {
        Some(current) if current >= 10 => Some(current / 10),
        _ => None,
    }
}

/// Keep only ASCII digits, e.g. for pasted text.
pub fn sanitize_digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Parse free text into an answer: digits only, empty means unset.
pub fn parse_answer(text: &str) -> Option<u32> {
    sanitize_digits(text)
        .chars()
        .fold(None, push_digit)
}

fn digit_count(value: u32) -> u32 {
    value.checked_ilog10().unwrap_or(0) + 1
}
