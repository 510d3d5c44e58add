// Parameter panel bridge
//
// Named controls bound to live state through getter/setter closures. A write
// lands immediately, so whatever reads the state next sees it; there is no
// deferred queue.

use crate::core::math::clamp;
use std::collections::HashMap;
use std::fmt;

/// Inclusive numeric range of a slider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, value: f32) -> f32 {
        clamp(value, self.min, self.max)
    }
}

/// A value flowing through the panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Float(f32),
    Bool(bool),
    Color([f32; 3]),
    /// Button press
    Action,
}

impl ParamValue {
    /// Name of the value's type, as used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Float(_) => "float",
            ParamValue::Bool(_) => "bool",
            ParamValue::Color(_) => "color",
            ParamValue::Action => "action",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Float(v) => write!(f, "{:.3}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Color([r, g, b]) => write!(f, "rgb({:.2}, {:.2}, {:.2})", r, g, b),
            ParamValue::Action => write!(f, "<action>"),
        }
    }
}

/// Panel errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Parameter already bound: {0}")]
    DuplicateParameter(String),

    #[error("Parameter {name} expects a {expected} value, got {actual}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
}

type Getter<C, T> = Box<dyn Fn(&C) -> T>;
type Setter<C, T> = Box<dyn Fn(&mut C, T)>;

enum Control<C> {
    Float {
        get: Getter<C, f32>,
        set: Setter<C, f32>,
        bounds: Option<Bounds>,
    },
    Toggle {
        get: Getter<C, bool>,
        set: Setter<C, bool>,
    },
    Color {
        get: Getter<C, [f32; 3]>,
        set: Setter<C, [f32; 3]>,
    },
    Action(Box<dyn Fn(&mut C)>),
}

impl<C> Control<C> {
    fn kind(&self) -> &'static str {
        match self {
            Control::Float { .. } => "float",
            Control::Toggle { .. } => "bool",
            Control::Color { .. } => "color",
            Control::Action(_) => "action",
        }
    }
}

struct Entry<C> {
    folder: String,
    name: String,
    control: Control<C>,
}

/// Controls grouped in folders, each bound to a field of `C`
pub struct ParameterPanel<C> {
    entries: Vec<Entry<C>>,
    index: HashMap<String, usize>,
}

impl<C> ParameterPanel<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn insert(&mut self, folder: &str, name: &str, control: Control<C>) -> Result<(), PanelError> {
        if self.index.contains_key(name) {
            return Err(PanelError::DuplicateParameter(name.to_string()));
        }
        log::debug!("Panel: bound {} control '{}/{}'", control.kind(), folder, name);
        self.index.insert(name.to_string(), self.entries.len());
        self.entries.push(Entry {
            folder: folder.to_string(),
            name: name.to_string(),
            control,
        });
        Ok(())
    }

    /// Bind a numeric slider; writes outside `bounds` are clamped
    pub fn bind(
        &mut self,
        folder: &str,
        name: &str,
        get: impl Fn(&C) -> f32 + 'static,
        set: impl Fn(&mut C, f32) + 'static,
        bounds: Option<Bounds>,
    ) -> Result<(), PanelError> {
        self.insert(
            folder,
            name,
            Control::Float {
                get: Box::new(get),
                set: Box::new(set),
                bounds,
            },
        )
    }

    /// Bind a checkbox
    pub fn bind_toggle(
        &mut self,
        folder: &str,
        name: &str,
        get: impl Fn(&C) -> bool + 'static,
        set: impl Fn(&mut C, bool) + 'static,
    ) -> Result<(), PanelError> {
        self.insert(
            folder,
            name,
            Control::Toggle {
                get: Box::new(get),
                set: Box::new(set),
            },
        )
    }

    /// Bind a color picker
    pub fn bind_color(
        &mut self,
        folder: &str,
        name: &str,
        get: impl Fn(&C) -> [f32; 3] + 'static,
        set: impl Fn(&mut C, [f32; 3]) + 'static,
    ) -> Result<(), PanelError> {
        self.insert(
            folder,
            name,
            Control::Color {
                get: Box::new(get),
                set: Box::new(set),
            },
        )
    }

    /// Bind a button
    pub fn bind_action(
        &mut self,
        folder: &str,
        name: &str,
        action: impl Fn(&mut C) + 'static,
    ) -> Result<(), PanelError> {
        self.insert(folder, name, Control::Action(Box::new(action)))
    }

    fn entry(&self, name: &str) -> Result<&Entry<C>, PanelError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| PanelError::UnknownParameter(name.to_string()))
    }

    /// Apply a value now. Returns the value actually stored.
    pub fn set(&self, state: &mut C, name: &str, value: ParamValue) -> Result<ParamValue, PanelError> {
        let entry = self.entry(name)?;

        let applied = match (&entry.control, value) {
            (Control::Float { set, bounds, .. }, ParamValue::Float(v)) => {
                let v = bounds.map_or(v, |b| b.clamp(v));
                set(state, v);
                ParamValue::Float(v)
            }
            (Control::Toggle { set, .. }, ParamValue::Bool(v)) => {
                set(state, v);
                ParamValue::Bool(v)
            }
            (Control::Color { set, .. }, ParamValue::Color(v)) => {
                let v = v.map(|c| clamp(c, 0.0, 1.0));
                set(state, v);
                ParamValue::Color(v)
            }
            (Control::Action(action), ParamValue::Action) => {
                action(state);
                ParamValue::Action
            }
            (control, value) => {
                return Err(PanelError::TypeMismatch {
                    name: name.to_string(),
                    expected: control.kind(),
                    actual: value.kind(),
                })
            }
        };

        log::debug!("Panel: {} = {}", name, applied);
        Ok(applied)
    }

    /// Press a button
    pub fn trigger(&self, state: &mut C, name: &str) -> Result<(), PanelError> {
        self.set(state, name, ParamValue::Action).map(|_| ())
    }

    /// Read the live value behind a control
    pub fn get(&self, state: &C, name: &str) -> Result<ParamValue, PanelError> {
        let entry = self.entry(name)?;
        Ok(match &entry.control {
            Control::Float { get, .. } => ParamValue::Float(get(state)),
            Control::Toggle { get, .. } => ParamValue::Bool(get(state)),
            Control::Color { get, .. } => ParamValue::Color(get(state)),
            Control::Action(_) => ParamValue::Action,
        })
    }

    /// Bounds of a slider
    pub fn bounds(&self, name: &str) -> Result<Option<Bounds>, PanelError> {
        match &self.entry(name)?.control {
            Control::Float { bounds, .. } => Ok(*bounds),
            _ => Ok(None),
        }
    }

    /// Folder names in order of first use
    pub fn folders(&self) -> Vec<&str> {
        let mut folders: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !folders.contains(&entry.folder.as_str()) {
                folders.push(&entry.folder);
            }
        }
        folders
    }

    /// Control names in a folder, in binding order
    pub fn controls_in<'a>(&'a self, folder: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.folder == folder)
            .map(|e| e.name.as_str())
    }

    /// Number of controls
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for ParameterPanel<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A named scene-level value with optional bounds
#[derive(Debug, Clone, PartialEq)]
pub struct TunableParameter<T> {
    name: String,
    value: T,
    bounds: Option<(T, T)>,
}

impl<T: PartialOrd + Copy> TunableParameter<T> {
    /// Create an unbounded parameter
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
            bounds: None,
        }
    }

    /// Create a parameter limited to `[min, max]`
    pub fn bounded(name: impl Into<String>, value: T, min: T, max: T) -> Self {
        let value = clamp(value, min, max);
        Self {
            name: name.into(),
            value,
            bounds: Some((min, max)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Store a new value, clamped to the bounds. Returns what was stored.
    pub fn set(&mut self, value: T) -> T {
        self.value = match self.bounds {
            Some((min, max)) => clamp(value, min, max),
            None => value,
        };
        self.value
    }

    pub fn bounds(&self) -> Option<(T, T)> {
        self.bounds
    }
}
