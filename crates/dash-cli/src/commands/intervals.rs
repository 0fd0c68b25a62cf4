//! `intervals` 명령어: 지원 간격 목록.

use dash_core::Timeframe;

/// 간격 목록 텍스트 (한 줄에 하나, 봉 길이 포함).
pub fn render() -> String {
    Timeframe::ALL
        .iter()
        .map(|tf| {
            let secs = tf.duration().num_seconds();
            let span = match secs {
                s if s % 86_400 == 0 => format!("{}d", s / 86_400),
                s if s % 3_600 == 0 => format!("{}h", s / 3_600),
                s => format!("{}m", s / 60),
            };
            format!("{:<4} {}", tf.as_binance_interval(), span)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn run() {
    println!("{}", render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_every_interval() {
        let text = render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 15);
        assert_eq!(lines[0], "1m   1m");
        assert_eq!(lines[7], "4h   4h");
        assert_eq!(lines[13], "1w   7d");
        assert_eq!(lines[14], "1M   30d");
    }
}
