//! CCD Inverse Kinematics
//!
//! Cyclic coordinate descent: each iteration walks a chain from the bone
//! nearest the effector out toward the root, rotating every bone so the
//! effector swings toward the target. The correction per bone and iteration
//! is capped by the chain's angle limit.
//!
//! Results are written back as the bones' local rotations, so a chain that
//! is not keyframed keeps its solved pose and the next frame's solve starts
//! from there.

use std::f32::consts::PI;

use glam::{EulerRot, Quat};
use puppet_core::LoadError;
use puppet_core::math::{finite_or, normalize_or_identity, position_of};
use smallvec::SmallVec;

use crate::records::IkRecord;
use crate::settings::IkSettings;
use crate::skeleton::Skeleton;

/// How a chain bone may rotate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintKind {
    Free,
    /// Rotates only around local X, with the angle kept in `[min_angle, max_angle]`.
    HingeX { min_angle: f32, max_angle: f32 },
}

impl ConstraintKind {
    /// Builds a hinge with an ordered, finite angle range.
    #[must_use]
    pub fn hinge_x(min_angle: f32, max_angle: f32) -> Self {
        let a = finite_or(min_angle, 0.0);
        let b = finite_or(max_angle, PI);
        Self::HingeX {
            min_angle: a.min(b),
            max_angle: a.max(b),
        }
    }

    /// Restricts a delta rotation to what this joint allows.
    #[must_use]
    pub fn constrain(&self, delta: Quat) -> Quat {
        match *self {
            Self::Free => delta,
            Self::HingeX {
                min_angle,
                max_angle,
            } => {
                let (x, _, _) = delta.to_euler(EulerRot::XYZ);
                // max/min instead of clamp: never panics on a bad range
                Quat::from_rotation_x(x.max(min_angle).min(max_angle))
            }
        }
    }
}

/// One rotatable chain bone and its joint limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IkLink {
    pub bone: usize,
    pub constraint: ConstraintKind,
}

/// Bones rotated so that `effector` reaches `target`.
#[derive(Debug, Clone)]
pub struct IkChain {
    target: usize,
    effector: usize,
    /// Effector-nearest first, fixed at load
    links: SmallVec<[IkLink; 4]>,
    max_angle_per_iteration: f32,
    iteration_count: u32,
}

impl IkChain {
    #[must_use]
    pub fn new(
        target: usize,
        effector: usize,
        links: impl IntoIterator<Item = IkLink>,
        max_angle_per_iteration: f32,
        iteration_count: u32,
    ) -> Self {
        Self {
            target,
            effector,
            links: links.into_iter().collect(),
            max_angle_per_iteration: finite_or(max_angle_per_iteration, PI).abs(),
            iteration_count,
        }
    }

    /// Resolves an IK record against a skeleton.
    ///
    /// Hinge constraints come from the record's explicit `hinge_links` or,
    /// failing that, from the bone-name heuristic in `settings`.
    pub fn from_record(
        chain_index: usize,
        record: &IkRecord,
        skeleton: &Skeleton,
        settings: &IkSettings,
    ) -> Result<Self, LoadError> {
        let context = |what: &str| format!("IK chain {chain_index} {what}");

        let target = skeleton.check_index(record.target, &context("target"))?;
        let effector = skeleton.check_index(record.effector, &context("effector"))?;
        if record.chain.is_empty() {
            return Err(LoadError::EmptyIkChain { chain: chain_index });
        }

        let mut links = SmallVec::with_capacity(record.chain.len());
        for &bone in &record.chain {
            skeleton.check_index(bone, &context("link"))?;
            let name = skeleton.bone(bone).map_or("", |b| b.name());
            let constraint =
                if record.hinge_links.contains(&bone) || settings.hinge.matches(name) {
                    settings.hinge.constraint()
                } else {
                    ConstraintKind::Free
                };
            links.push(IkLink { bone, constraint });
        }

        Ok(Self {
            target,
            effector,
            links,
            max_angle_per_iteration: finite_or(record.max_angle_per_iteration, PI).abs(),
            iteration_count: record.iteration_count,
        })
    }

    #[inline]
    #[must_use]
    pub fn target(&self) -> usize {
        self.target
    }

    #[inline]
    #[must_use]
    pub fn effector(&self) -> usize {
        self.effector
    }

    #[inline]
    #[must_use]
    pub fn links(&self) -> &[IkLink] {
        &self.links
    }

    #[inline]
    #[must_use]
    pub fn max_angle_per_iteration(&self) -> f32 {
        self.max_angle_per_iteration
    }

    #[inline]
    #[must_use]
    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }
}

/// How a chain solve ended. Running out of iterations is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkOutcome {
    /// The effector reached the target during `iteration` (0-based).
    Converged { iteration: u32 },
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcdSolver {
    pub convergence_distance_sq: f32,
    pub min_correction_angle: f32,
}

impl Default for CcdSolver {
    fn default() -> Self {
        Self::from(&IkSettings::default())
    }
}

impl From<&IkSettings> for CcdSolver {
    fn from(settings: &IkSettings) -> Self {
        Self {
            convergence_distance_sq: settings.convergence_distance_sq,
            min_correction_angle: settings.min_correction_angle,
        }
    }
}

impl CcdSolver {
    /// Solves one chain in place.
    pub fn solve(&self, chain: &IkChain, skeleton: &mut Skeleton) -> IkOutcome {
        for iteration in 0..chain.iteration_count {
            for link in &chain.links {
                let (Some(bone), Some(effector), Some(target)) = (
                    skeleton.bone(link.bone),
                    skeleton.bone(chain.effector),
                    skeleton.bone(chain.target),
                ) else {
                    return IkOutcome::Exhausted;
                };

                // Effector and target in this bone's local space
                let inv_world = bone.world_matrix().inverse();
                let effector_local =
                    inv_world.transform_point3(position_of(effector.world_matrix()));
                let target_local = inv_world.transform_point3(position_of(target.world_matrix()));

                if (target_local - effector_local).length_squared() < self.convergence_distance_sq
                {
                    return IkOutcome::Converged { iteration };
                }

                let (Some(to_effector), Some(to_target)) =
                    (effector_local.try_normalize(), target_local.try_normalize())
                else {
                    continue;
                };

                let angle = to_effector.dot(to_target).clamp(-1.0, 1.0).acos();
                if angle < self.min_correction_angle {
                    continue;
                }
                let angle = angle.min(chain.max_angle_per_iteration);

                // Axis oriented so the delta carries the effector onto the target
                let Some(axis) = to_effector.cross(to_target).try_normalize() else {
                    continue;
                };

                let delta = link
                    .constraint
                    .constrain(Quat::from_axis_angle(axis, angle));

                if let Some(bone) = skeleton.bone_mut(link.bone) {
                    bone.rotation = normalize_or_identity(bone.rotation * delta);
                }

                // Subtree covers earlier links and the effector
                skeleton.update_matrices(link.bone);
                skeleton.update_world_matrix(chain.target);
            }
        }
        IkOutcome::Exhausted
    }

    /// Solves every chain in load order; later chains see earlier results.
    pub fn solve_all(&self, chains: &[IkChain], skeleton: &mut Skeleton) {
        for (index, chain) in chains.iter().enumerate() {
            let outcome = self.solve(chain, skeleton);
            log::trace!("IK chain {index}: {outcome:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hinge_zeroes_off_axis_rotation() {
        let hinge = ConstraintKind::hinge_x(0.0, PI);
        let delta = Quat::from_euler(EulerRot::XYZ, 0.3, 0.2, -0.1);
        let (x, y, z) = hinge.constrain(delta).to_euler(EulerRot::XYZ);
        assert!(x > 0.0);
        assert!(y.abs() < 1e-5 && z.abs() < 1e-5);
    }

    #[test]
    fn hinge_range_is_ordered() {
        let ConstraintKind::HingeX {
            min_angle,
            max_angle,
        } = ConstraintKind::hinge_x(1.0, -1.0)
        else {
            panic!("expected hinge");
        };
        assert_eq!((min_angle, max_angle), (-1.0, 1.0));
    }
}
