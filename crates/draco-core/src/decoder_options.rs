use std::collections::HashMap;

pub const SKIP_ATTRIBUTE_TRANSFORM: &str = "skip_attribute_transform";

/// String-keyed decoder settings.
#[derive(Debug, Clone, Default)]
pub struct DecoderOptions {
    global_options: HashMap<String, i32>,
}

impl DecoderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_global_bool(&mut self, key: &str, value: bool) {
        self.global_options.insert(key.to_string(), value as i32);
    }

    pub fn get_global_bool(&self, key: &str, default_val: bool) -> bool {
        self.global_options.get(key).map_or(default_val, |v| *v != 0)
    }

    /// Leave lossy attributes in their portable (quantized) form and attach
    /// the transform parameters instead of reverting the transform.
    pub fn set_skip_attribute_transform(&mut self, skip: bool) {
        self.set_global_bool(SKIP_ATTRIBUTE_TRANSFORM, skip);
    }

    pub fn skip_attribute_transform(&self) -> bool {
        self.get_global_bool(SKIP_ATTRIBUTE_TRANSFORM, false)
    }
}
