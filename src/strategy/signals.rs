use crate::models::Signal;

/// Map an RSI reading onto a signal
///
/// Strict inequalities: a reading exactly on a threshold is `Hold`.
/// Readings outside 0..=100 are classified like any other number.
pub fn classify(rsi: f64, oversold: f64, overbought: f64) -> Signal {
    if rsi < oversold {
        Signal::Buy
    } else if rsi > overbought {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Oversold/overbought bounds used to classify RSI readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalClassifier {
    pub oversold: f64,
    pub overbought: f64,
}

impl SignalClassifier {
    pub fn new(oversold: f64, overbought: f64) -> Self {
        Self {
            oversold,
            overbought,
        }
    }

    pub fn classify(&self, rsi: f64) -> Signal {
        classify(rsi, self.oversold, self.overbought)
    }
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self::new(30.0, 70.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_readings() {
        let classifier = SignalClassifier::default();

        assert_eq!(classifier.classify(25.0), Signal::Buy);
        assert_eq!(classifier.classify(70.0), Signal::Hold);
        assert_eq!(classifier.classify(75.0), Signal::Sell);
        assert_eq!(classifier.classify(50.0), Signal::Hold);
    }

    #[test]
    fn test_thresholds_are_hold() {
        assert_eq!(classify(30.0, 30.0, 70.0), Signal::Hold);
        assert_eq!(classify(70.0, 30.0, 70.0), Signal::Hold);
        assert_eq!(classify(29.999, 30.0, 70.0), Signal::Buy);
        assert_eq!(classify(70.001, 30.0, 70.0), Signal::Sell);
    }

    #[test]
    fn test_out_of_range_tolerated() {
        assert_eq!(classify(-5.0, 30.0, 70.0), Signal::Buy);
        assert_eq!(classify(140.0, 30.0, 70.0), Signal::Sell);
    }

    #[test]
    fn test_sweep_matches_bands() {
        let (oversold, overbought) = (20.0, 80.0);
        for step in -20..=240 {
            let rsi = step as f64 * 0.5;
            let expected = if rsi < oversold {
                Signal::Buy
            } else if rsi > overbought {
                Signal::Sell
            } else {
                Signal::Hold
            };
            assert_eq!(classify(rsi, oversold, overbought), expected, "rsi={}", rsi);
        }
    }
}
