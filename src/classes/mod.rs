//! The class registry: an ordered list of label classes.
//!
//! A class is identified by its name. Its position in the registry is what
//! boxes reference (`class_index`), while its export id is what gets written
//! into YOLO records. The two are independent: export ids can be edited
//! freely and are not required to be unique.

mod color;

pub use color::{ParseRgbError, Rgb, PALETTE};

use serde::Serialize;

use crate::error::YoloEditError;

/// A single label class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassDef {
    pub name: String,
    pub color: Rgb,
    pub export_id: u32,
}

/// Ordered collection of [`ClassDef`]s with unique names.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassDef>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The classes a fresh labelling session starts with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, color, id) in [
            ("person", Rgb::new(0xFF, 0x00, 0x00), 0),
            ("car", Rgb::new(0x00, 0xFF, 0x00), 1),
            ("bicycle", Rgb::new(0x00, 0x00, 0xFF), 2),
        ] {
            registry.classes.push(ClassDef {
                name: name.to_string(),
                color,
                export_id: id,
            });
        }
        registry
    }

    /// Appends a class and returns its index.
    ///
    /// The name is trimmed. A missing color is generated at random and a
    /// missing export id defaults to the current class count.
    pub fn add(
        &mut self,
        name: &str,
        color: Option<Rgb>,
        export_id: Option<u32>,
    ) -> Result<usize, YoloEditError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(YoloEditError::EmptyClassName);
        }
        if self.position(name).is_some() {
            return Err(YoloEditError::DuplicateClass(name.to_string()));
        }

        let export_id = export_id.unwrap_or(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.to_string(),
            color: color.unwrap_or_else(Rgb::random),
            export_id,
        });
        Ok(self.classes.len() - 1)
    }

    /// Sets the export id of a class. Any value is accepted, duplicates included.
    pub fn set_export_id(&mut self, name: &str, export_id: u32) -> Result<(), YoloEditError> {
        let index = self
            .position(name)
            .ok_or_else(|| YoloEditError::UnknownClass(name.trim().to_string()))?;
        self.classes[index].export_id = export_id;
        Ok(())
    }

    /// Removes a class and returns the index it occupied.
    ///
    /// Callers must apply the box cascade for that index (see
    /// [`BoxStore::remove_class_index`](crate::store::BoxStore::remove_class_index)).
    pub fn remove(&mut self, name: &str) -> Result<usize, YoloEditError> {
        let index = self
            .position(name)
            .ok_or_else(|| YoloEditError::UnknownClass(name.trim().to_string()))?;
        self.classes.remove(index);
        Ok(index)
    }

    /// All classes in positional order.
    pub fn all(&self) -> &[ClassDef] {
        &self.classes
    }

    pub fn get(&self, index: usize) -> Option<&ClassDef> {
        self.classes.get(index)
    }

    /// Index of the class with the given name, compared after trimming.
    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.classes.iter().position(|c| c.name == name)
    }

    /// Index of the first class exporting as `export_id`.
    pub fn position_of_export_id(&self, export_id: u32) -> Option<usize> {
        self.classes.iter().position(|c| c.export_id == export_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
    }
}
