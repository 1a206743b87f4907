//! The host side of randomization: where sampled values end up.
use glam::{Quat, Vec3};

use crate::parameter::ParameterValue;
use crate::tags::ObjectId;

/// Host collaborator that applies randomized values to scene objects.
///
/// Every method defaults to doing nothing, so hosts only implement what their
/// randomizers use.
pub trait SceneTarget {
    /// Sets the world rotation of `object`.
    fn set_rotation(&mut self, object: ObjectId, rotation: Quat) {
        let _ = (object, rotation);
    }

    /// Sets the world position of `object`.
    fn set_position(&mut self, object: ObjectId, position: Vec3) {
        let _ = (object, position);
    }

    /// Sets a named property (material value, light setting, ...) on `object`.
    fn set_property(&mut self, object: ObjectId, name: &str, value: &ParameterValue) {
        let _ = (object, name, value);
    }

    /// Places an instance of the prefab `category` at `position`.
    fn place_instance(&mut self, category: &str, position: Vec3) {
        let _ = (category, position);
    }

    /// Removes every instance created through [`place_instance`](Self::place_instance).
    fn clear_instances(&mut self) {}
}

/// Target that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTarget;

impl SceneTarget for NullTarget {}

/// A command received by a [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq)]
pub enum TargetCommand {
    SetRotation(ObjectId, Quat),
    SetPosition(ObjectId, Vec3),
    SetProperty(ObjectId, String, ParameterValue),
    PlaceInstance(String, Vec3),
    ClearInstances,
}

/// Target that records every command, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingTarget {
    commands: Vec<TargetCommand>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[TargetCommand] {
        &self.commands
    }

    pub fn into_inner(self) -> Vec<TargetCommand> {
        self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Instances placed since the last clear.
    pub fn live_instances(&self) -> Vec<(&str, Vec3)> {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, TargetCommand::ClearInstances))
            .map_or(0, |i| i + 1);
        self.commands[start..]
            .iter()
            .filter_map(|c| match c {
                TargetCommand::PlaceInstance(category, position) => {
                    Some((category.as_str(), *position))
                }
                _ => None,
            })
            .collect()
    }
}

impl SceneTarget for RecordingTarget {
    fn set_rotation(&mut self, object: ObjectId, rotation: Quat) {
        self.commands
            .push(TargetCommand::SetRotation(object, rotation));
    }

    fn set_position(&mut self, object: ObjectId, position: Vec3) {
        self.commands
            .push(TargetCommand::SetPosition(object, position));
    }

    fn set_property(&mut self, object: ObjectId, name: &str, value: &ParameterValue) {
        self.commands.push(TargetCommand::SetProperty(
            object,
            name.to_owned(),
            value.clone(),
        ));
    }

    fn place_instance(&mut self, category: &str, position: Vec3) {
        self.commands
            .push(TargetCommand::PlaceInstance(category.to_owned(), position));
    }

    fn clear_instances(&mut self) {
        self.commands.push(TargetCommand::ClearInstances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_target_accepts_everything() {
        let mut target = NullTarget;
        target.set_rotation(ObjectId(1), Quat::IDENTITY);
        target.place_instance("cube", Vec3::ZERO);
        target.clear_instances();
    }

    #[test]
    fn recording_target_tracks_live_instances() {
        let mut target = RecordingTarget::new();
        target.place_instance("a", Vec3::X);
        target.clear_instances();
        target.place_instance("b", Vec3::Y);
        target.set_position(ObjectId(3), Vec3::Z);
        target.place_instance("c", Vec3::Z);
        assert_eq!(target.commands().len(), 5);
        assert_eq!(target.live_instances(), vec![("b", Vec3::Y), ("c", Vec3::Z)]);
    }
}
