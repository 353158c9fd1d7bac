//! Swept vertex-face and edge-edge tests.
//!
//! Every primitive moves linearly from its previous position (`t = 0`) to its
//! current position (`t = 1`). Each test reports the earliest `t` at which the
//! closest-point distance drops to the thickness. Four points become coplanar
//! at the roots of a cubic in `t`; a root where the primitives actually meet
//! marks the hit as resolved. Contacts that never pass through coplanarity
//! (a glide within thickness, resting contact, sliding inside the face plane)
//! are found by a bounded search of the distance over the whole step.

use glam::{DVec3, Vec3};
use smallvec::{SmallVec, smallvec};

use crate::{
    config::CollisionConfig,
    utils::math::{closest_point_on_triangle, closest_points_on_segments},
};

/// Relative size below which coplanarity values count as zero.
const COPLANAR_EPSILON: f64 = 1e-12;
const MAX_BISECTIONS: usize = 64;
/// Cap on the windows one proximity search may open.
const MAX_SEARCH_WINDOWS: usize = 4096;

/// Inputs shared by every swept test in a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcdParams {
    pub thickness: f64,
    pub root_tolerance: f64,
    pub degenerate_epsilon: f32,
}

impl CcdParams {
    pub fn new(thickness: f32, root_tolerance: f64, degenerate_epsilon: f32) -> Self {
        Self {
            thickness: f64::from(thickness.max(0.0)),
            root_tolerance: root_tolerance.max(f64::EPSILON),
            degenerate_epsilon,
        }
    }

    pub fn from_config(config: &CollisionConfig) -> Self {
        Self::new(config.thickness, config.root_tolerance, config.degenerate_epsilon)
    }
}

impl Default for CcdParams {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

/// Outcome of a single swept sub-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcdHit {
    /// Earliest normalised time within the step at which the primitives are
    /// within thickness.
    pub time: f64,
    /// Closest distance at `time`.
    pub distance: f64,
    /// VF: `[1, wa, wb, wc]` (face barycentrics). EE: `[1 - s, s, 1 - t, t]`.
    pub weights: [f64; 4],
    /// The primitives met at a coplanarity root during the step; `false` for
    /// proximity-only contact.
    pub resolved: bool,
}

/// Vertex `point = [previous, current]` against a moving face.
pub fn vertex_face(
    point: [Vec3; 2],
    face_previous: [Vec3; 3],
    face_current: [Vec3; 3],
    params: &CcdParams,
) -> Option<CcdHit> {
    let p0 = point[0].as_dvec3();
    let dp = point[1].as_dvec3() - p0;
    let [a0, b0, c0] = face_previous.map(|v| v.as_dvec3());
    let da = face_current[0].as_dvec3() - a0;
    let db = face_current[1].as_dvec3() - b0;
    let dc = face_current[2].as_dvec3() - c0;

    let roots = coplanarity_roots(
        [b0 - a0, db - da],
        [c0 - a0, dc - da],
        [p0 - a0, dp - da],
        params.root_tolerance,
    );

    let proximity = |t: f64| {
        let p = p0 + dp * t;
        let (closest, bary) =
            closest_point_on_triangle(p, a0 + da * t, b0 + db * t, c0 + dc * t);
        ((p - closest).length(), [1.0, bary[0], bary[1], bary[2]])
    };

    let motion = max_length(&[dp, da, db, dc]);
    resolve(&roots, proximity, motion, params)
}

/// Edge `a = (a0, a1)` against edge `b = (b0, b1)`, both moving.
pub fn edge_edge(
    a_previous: [Vec3; 2],
    a_current: [Vec3; 2],
    b_previous: [Vec3; 2],
    b_current: [Vec3; 2],
    params: &CcdParams,
) -> Option<CcdHit> {
    let [a0, a1] = a_previous.map(|v| v.as_dvec3());
    let [b0, b1] = b_previous.map(|v| v.as_dvec3());
    let da0 = a_current[0].as_dvec3() - a0;
    let da1 = a_current[1].as_dvec3() - a1;
    let db0 = b_current[0].as_dvec3() - b0;
    let db1 = b_current[1].as_dvec3() - b1;

    let roots = coplanarity_roots(
        [a1 - a0, da1 - da0],
        [b1 - b0, db1 - db0],
        [b0 - a0, db0 - da0],
        params.root_tolerance,
    );

    let proximity = |t: f64| {
        let (s, u, ca, cb) = closest_points_on_segments(
            a0 + da0 * t,
            a1 + da1 * t,
            b0 + db0 * t,
            b1 + db1 * t,
        );
        ((cb - ca).length(), [1.0 - s, s, 1.0 - u, u])
    };

    let motion = max_length(&[da0, da1, db0, db1]);
    resolve(&roots, proximity, motion, params)
}

fn resolve<F>(roots: &[f64], proximity: F, motion: f64, params: &CcdParams) -> Option<CcdHit>
where
    F: Fn(f64) -> (f64, [f64; 4]),
{
    // The closest distance changes no faster than the two fastest vertices
    // combined, and `motion` bounds each of them.
    let rate = 2.0 * motion;
    // A root is only known to within `root_tolerance`.
    let slack = params.root_tolerance * rate;

    let crossing = roots.iter().find_map(|&time| {
        let (distance, weights) = proximity(time);
        (distance <= params.thickness + slack).then_some(CcdHit {
            time,
            distance,
            weights,
            resolved: true,
        })
    });
    let approach = earliest_approach(&proximity, rate, params);

    match (crossing, approach) {
        (Some(crossing), Some(approach)) if approach.time < crossing.time => Some(CcdHit {
            resolved: true,
            ..approach
        }),
        (Some(crossing), _) => Some(crossing),
        (None, approach) => approach,
    }
}

/// Earliest `t` in `[0, 1]` with `proximity(t) <= thickness`.
///
/// Windows are halved depth-first, earliest first. A window is dropped when
/// `rate` shows the distance cannot reach the thickness anywhere inside it.
/// Once a sample is within thickness only the windows before it are searched.
/// Windows narrower than `root_tolerance` are not split further.
fn earliest_approach<F>(proximity: &F, rate: f64, params: &CcdParams) -> Option<CcdHit>
where
    F: Fn(f64) -> (f64, [f64; 4]),
{
    let thickness = params.thickness;
    let hit = |time: f64, (distance, weights): (f64, [f64; 4])| CcdHit {
        time,
        distance,
        weights,
        resolved: false,
    };

    let start = proximity(0.0);
    if start.0 <= thickness {
        return Some(hit(0.0, start));
    }
    let end = proximity(1.0);
    let mut best = (end.0 <= thickness).then(|| hit(1.0, end));

    let mut stack: SmallVec<[(f64, f64, f64, f64); 32]> = smallvec![(0.0, start.0, 1.0, end.0)];
    let mut windows = 0;
    while let Some((lo, d_lo, hi, d_hi)) = stack.pop() {
        windows += 1;
        if windows > MAX_SEARCH_WINDOWS {
            break;
        }

        let width = hi - lo;
        if 0.5 * (d_lo + d_hi - rate * width) > thickness || width <= params.root_tolerance {
            continue;
        }

        let mid = 0.5 * (lo + hi);
        let sample = proximity(mid);
        let d_mid = sample.0;
        if d_mid <= thickness {
            best = Some(hit(mid, sample));
            stack.clear();
            stack.push((lo, d_lo, mid, d_mid));
        } else {
            stack.push((mid, d_mid, hi, d_hi));
            stack.push((lo, d_lo, mid, d_mid));
        }
    }

    best
}

fn max_length(vectors: &[DVec3]) -> f64 {
    vectors.iter().map(|v| v.length()).fold(0.0, f64::max)
}

/// Roots in `[0, 1]` of `((u × v) · w)(t)` where each argument is
/// `[value at t = 0, change over the step]`.
///
/// Motion that keeps the four points coplanar throughout (parallel edges,
/// in-plane sliding) has no isolated roots and yields nothing; such contacts
/// surface through the proximity search in `resolve` instead.
pub fn coplanarity_roots(u: [DVec3; 2], v: [DVec3; 2], w: [DVec3; 2], tolerance: f64) -> SmallVec<[f64; 4]> {
    let [u0, du] = u;
    let [v0, dv] = v;
    let [w0, dw] = w;

    let n0 = u0.cross(v0);
    let n1 = u0.cross(dv) + du.cross(v0);
    let n2 = du.cross(dv);

    let coeffs = [
        n0.dot(w0),
        n0.dot(dw) + n1.dot(w0),
        n1.dot(dw) + n2.dot(w0),
        n2.dot(dw),
    ];

    let magnitude = (u0.length() + du.length()) * (v0.length() + dv.length()) * (w0.length() + dw.length());
    let zero = COPLANAR_EPSILON * magnitude;
    if coeffs.iter().all(|c| c.abs() <= zero) {
        return SmallVec::new();
    }

    cubic_roots_in_unit_interval(coeffs, zero, tolerance)
}

/// Roots of `c0 + c1 t + c2 t² + c3 t³` in `[0, 1]`, ascending.
///
/// The interval is cut at the critical points so that each piece is monotone,
/// then every piece with a sign change is bisected down to `tolerance`. Values
/// with magnitude `<= zero` count as roots. The reported root is the lower end
/// of the final bracket, i.e. never after the true crossing.
pub fn cubic_roots_in_unit_interval(coeffs: [f64; 4], zero: f64, tolerance: f64) -> SmallVec<[f64; 4]> {
    let [c0, c1, c2, c3] = coeffs;
    let eval = |t: f64| ((c3 * t + c2) * t + c1) * t + c0;

    let mut breaks: SmallVec<[f64; 4]> = smallvec![0.0];
    breaks.extend(
        quadratic_roots(3.0 * c3, 2.0 * c2, c1)
            .into_iter()
            .filter(|&t| t > 0.0 && t < 1.0),
    );
    breaks.push(1.0);

    let mut roots: SmallVec<[f64; 4]> = SmallVec::new();
    let push_root = |t: f64, roots: &mut SmallVec<[f64; 4]>| {
        if roots.last().map_or(true, |&last| t - last > tolerance) {
            roots.push(t);
        }
    };

    for window in breaks.windows(2) {
        let (mut lo, mut hi) = (window[0], window[1]);
        let mut f_lo = eval(lo);
        let f_hi = eval(hi);

        if f_lo.abs() <= zero {
            push_root(lo, &mut roots);
            continue;
        }
        if f_hi.abs() <= zero || f_lo.signum() == f_hi.signum() {
            continue;
        }

        for _ in 0..MAX_BISECTIONS {
            if hi - lo <= tolerance {
                break;
            }
            let mid = 0.5 * (lo + hi);
            let f_mid = eval(mid);
            if f_mid.abs() <= zero {
                lo = mid;
                break;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        push_root(lo, &mut roots);
    }

    if eval(1.0).abs() <= zero {
        push_root(1.0, &mut roots);
    }

    roots
}

/// Real roots of `a t² + b t + c`, ascending. Degrades to the linear case.
fn quadratic_roots(a: f64, b: f64, c: f64) -> SmallVec<[f64; 2]> {
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return SmallVec::new();
    }

    if a.abs() <= COPLANAR_EPSILON * scale {
        if b.abs() <= COPLANAR_EPSILON * scale {
            return SmallVec::new();
        }
        return smallvec![-c / b];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return SmallVec::new();
    }
    let sqrt_disc = disc.sqrt();
    // Numerically stable pairing avoids cancellation in `-b ± sqrt`.
    let q = -0.5 * (b + b.signum() * sqrt_disc);
    let mut roots: SmallVec<[f64; 2]> = if q == 0.0 {
        smallvec![0.0]
    } else {
        smallvec![q / a, c / q]
    };
    roots.sort_by(f64::total_cmp);
    roots
}
