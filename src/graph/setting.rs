use crate::error::SettingError;

/// A small enumerated runtime parameter (e.g. a noise colour).
///
/// The value is an index into a fixed label table. Out-of-range values are
/// rejected, never clamped.
#[derive(Debug, Clone)]
pub struct EnumSetting {
    name: &'static str,
    short_name: &'static str,
    labels: &'static [&'static str],
    value: u32,
}

impl EnumSetting {
    pub fn new(name: &'static str, short_name: &'static str, labels: &'static [&'static str]) -> Self {
        Self {
            name,
            short_name,
            labels,
            value: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Four-letter tag used by serialised patches.
    pub fn short_name(&self) -> &'static str {
        self.short_name
    }

    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    pub fn value_u32(&self) -> u32 {
        self.value
    }

    pub fn label(&self) -> &'static str {
        self.labels[self.value as usize]
    }

    pub fn set_u32(&mut self, value: u32) -> Result<(), SettingError> {
        if (value as usize) < self.labels.len() {
            self.value = value;
            Ok(())
        } else {
            Err(SettingError::OutOfRange {
                setting: self.name,
                value,
                count: self.labels.len() as u32,
            })
        }
    }

    /// Typed setters go through here; their enums cannot be out of range.
    pub(crate) fn set_index(&mut self, index: u32) {
        debug_assert!((index as usize) < self.labels.len());
        self.value = index;
    }

    /// Select by label, case-sensitive.
    pub fn set_label(&mut self, label: &str) -> Result<(), SettingError> {
        match self.labels.iter().position(|l| *l == label) {
            Some(index) => self.set_u32(index as u32),
            None => Err(SettingError::UnknownLabel { setting: self.name }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: &[&str] = &["A", "B"];

    #[test]
    fn rejects_out_of_range_without_changing_value() {
        let mut setting = EnumSetting::new("mode", "MODE", LABELS);
        setting.set_u32(1).unwrap();

        let err = setting.set_u32(2).unwrap_err();
        assert_eq!(
            err,
            SettingError::OutOfRange {
                setting: "mode",
                value: 2,
                count: 2
            }
        );
        assert_eq!(setting.value_u32(), 1);
        assert_eq!(setting.label(), "B");
    }

    #[test]
    fn selects_by_label() {
        let mut setting = EnumSetting::new("mode", "MODE", LABELS);
        setting.set_label("B").unwrap();
        assert_eq!(setting.value_u32(), 1);
        assert!(setting.set_label("C").is_err());
        assert_eq!(setting.value_u32(), 1);
    }
}
