//! Vector helpers for bond placement.
//!
//! Everything here works on molecule-space coordinates and is total over
//! non-degenerate input. Callers must not pass coincident points.

use glam::DVec2;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::bond::{BondDirection, BondOrder, BondStereo};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::traits::{HasAromaticity, HasBondDirection, HasBondOrder, HasBondStereo};

/// Start and end of a straight stroke.
pub type Segment = (DVec2, DVec2);

/// Fraction cut from each end of the inner line of a multiple bond.
pub const MULTIPLE_BOND_TRUNCATION: f64 = 0.15;

/// Unit vector perpendicular to `cds1 -> cds2`, rotated a quarter turn
/// anticlockwise from `cds1 - cds2`.
pub fn perpendicular(cds1: DVec2, cds2: DVec2) -> DVec2 {
    (cds1 - cds2).perp().normalize()
}

/// Perpendicular to `cds1 -> cds2` that points into the angle made by
/// (1, 2) and (2, 3).
pub fn inner_perpendicular(cds1: DVec2, cds2: DVec2, cds3: DVec2) -> DVec2 {
    let perp = perpendicular(cds1, cds2);
    let v1 = cds1 - cds2;
    let v2 = cds2 - cds3;
    let obv = v1 - v2;
    if obv.dot(perp) < 0.0 {
        -perp
    } else {
        perp
    }
}

/// Perpendicular pointing into the ring for a bond that sits in at least
/// one ring.
///
/// A bond shared by several rings prefers the first ring whose bonds all
/// match its own aromaticity, so that an aromatic double bond lands inside
/// the aromatic ring of a fused system. Otherwise the first ring is used.
pub fn bond_inside_ring<A, B: HasAromaticity>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    bond: EdgeIndex,
    cds1: DVec2,
    cds2: DVec2,
    at_cds: &[DVec2],
) -> DVec2 {
    let bond_in_rings = rings.rings_with_bond(bond);
    let Some(&first) = bond_in_rings.first() else {
        return perpendicular(cds1, cds2);
    };

    let calc_perp = |ring: &[EdgeIndex]| -> Option<DVec2> {
        let (begin, _) = mol.bond_endpoints(bond)?;
        mol.bonds_of(begin)
            .filter(|&b2| b2 != bond && ring.contains(&b2))
            .find_map(|b2| mol.other_atom(b2, begin))
            .map(|atom3| inner_perpendicular(cds1, cds2, at_cds[atom3.index()]))
    };

    if bond_in_rings.len() > 1 {
        let aromatic = mol.bond(bond).is_aromatic();
        for &ring_idx in &bond_in_rings {
            let ring = &rings.bond_rings()[ring_idx];
            if ring.iter().any(|&b2| mol.bond(b2).is_aromatic() != aromatic) {
                continue;
            }
            if let Some(perp) = calc_perp(ring) {
                return perp;
            }
        }
    }

    calc_perp(&rings.bond_rings()[first]).unwrap_or_else(|| perpendicular(cds1, cds2))
}

/// Degree-2 atom whose two bonds have the same order and point in nearly
/// opposite directions, e.g. the centre of an allene.
pub fn is_linear_atom<A, B: HasBondOrder>(
    mol: &Mol<A, B>,
    atom: NodeIndex,
    at_cds: &[DVec2],
) -> bool {
    if mol.degree(atom) != 2 {
        return false;
    }
    let at1_cds = at_cds[atom.index()];
    let mut vecs = [DVec2::ZERO; 2];
    let mut orders = [BondOrder::Single; 2];
    for (i, bond) in mol.bonds_of(atom).take(2).enumerate() {
        let Some(nbr) = mol.other_atom(bond, atom) else {
            return false;
        };
        vecs[i] = (at_cds[nbr.index()] - at1_cds).normalize_or_zero();
        orders[i] = mol.bond(bond).bond_order();
    }
    orders[0] == orders[1] && vecs[0].dot(vecs[1]) < -0.95
}

/// Inside direction for a chain double bond: towards the angle made with
/// the next bond off the more substituted end.
pub fn bond_inside_double_bond<A, B>(
    mol: &Mol<A, B>,
    bond: EdgeIndex,
    at_cds: &[DVec2],
) -> Option<DVec2> {
    let (at1, at2) = mol.bond_endpoints(bond)?;
    let (bond_atom, end_atom) = if mol.degree(at1) > 1 {
        (at1, at2)
    } else {
        (at2, at1)
    };
    let at3 = mol
        .bonds_of(bond_atom)
        .filter(|&b2| b2 != bond)
        .find_map(|b2| mol.other_atom(b2, bond_atom))?;
    Some(inner_perpendicular(
        at_cds[end_atom.index()],
        at_cds[bond_atom.index()],
        at_cds[at3.index()],
    ))
}

/// The two strokes of a double or aromatic bond between `at1_cds` and
/// `at2_cds`.
///
/// Terminal and linear ends give a symmetric pair at `±offset`. Bonds of
/// unknown geometry give a crossed pair. Anything else is drawn as the
/// atom-atom line plus an inner line truncated at both ends and offset by
/// `2 * offset` towards the ring interior or the inside of the chain angle.
pub fn double_bond_lines<A, B>(
    mol: &Mol<A, B>,
    rings: &RingInfo,
    offset: f64,
    bond: EdgeIndex,
    at1_cds: DVec2,
    at2_cds: DVec2,
    at_cds: &[DVec2],
) -> (Segment, Segment)
where
    B: HasBondOrder + HasAromaticity + HasBondDirection + HasBondStereo,
{
    let Some((at1, at2)) = mol.bond_endpoints(bond) else {
        return ((at1_cds, at2_cds), (at1_cds, at2_cds));
    };
    let b = mol.bond(bond);
    if mol.degree(at1) == 1
        || mol.degree(at2) == 1
        || is_linear_atom(mol, at1, at_cds)
        || is_linear_atom(mol, at2, at_cds)
    {
        let perp = perpendicular(at1_cds, at2_cds) * offset;
        ((at1_cds + perp, at2_cds + perp), (at1_cds - perp, at2_cds - perp))
    } else if b.bond_direction() == BondDirection::EitherDouble
        || b.bond_stereo() == BondStereo::Any
    {
        let perp = perpendicular(at1_cds, at2_cds) * offset;
        ((at1_cds + perp, at2_cds - perp), (at1_cds - perp, at2_cds + perp))
    } else {
        let offset = offset * 2.0;
        let perp = if rings.is_ring_bond(bond) {
            bond_inside_ring(mol, rings, bond, at1_cds, at2_cds, at_cds)
        } else {
            bond_inside_double_bond(mol, bond, at_cds)
                .unwrap_or_else(|| perpendicular(at1_cds, at2_cds))
        };
        let bv = at1_cds - at2_cds;
        (
            (at1_cds, at2_cds),
            (
                at1_cds - bv * MULTIPLE_BOND_TRUNCATION + perp * offset,
                at2_cds + bv * MULTIPLE_BOND_TRUNCATION + perp * offset,
            ),
        )
    }
}

/// The two outer strokes of a triple bond, at `±2 * offset`. Ends at a
/// degree-1 atom are not truncated.
pub fn triple_bond_lines<A, B>(
    mol: &Mol<A, B>,
    offset: f64,
    bond: EdgeIndex,
    at1_cds: DVec2,
    at2_cds: DVec2,
) -> (Segment, Segment) {
    let dbo = 2.0 * offset;
    let perp = perpendicular(at1_cds, at2_cds);
    let (trunc1, trunc2) = match mol.bond_endpoints(bond) {
        Some((at1, at2)) => (
            if mol.degree(at1) == 1 { 0.0 } else { MULTIPLE_BOND_TRUNCATION },
            if mol.degree(at2) == 1 { 0.0 } else { MULTIPLE_BOND_TRUNCATION },
        ),
        None => (MULTIPLE_BOND_TRUNCATION, MULTIPLE_BOND_TRUNCATION),
    };
    let bv = at1_cds - at2_cds;
    let s = at1_cds - bv * trunc1;
    let f = at2_cds + bv * trunc2;
    ((s + perp * dbo, f + perp * dbo), (s - perp * dbo, f - perp * dbo))
}

/// Where `p1 -> p2` first meets the ellipse centred on `centre`.
///
/// Returns `p2` unchanged when the ellipse is degenerate, the line misses
/// it, or both crossings lie outside the segment.
pub fn ellipse_line_intersection(
    centre: DVec2,
    xradius: f64,
    yradius: f64,
    p1: DVec2,
    p2: DVec2,
) -> DVec2 {
    if xradius < 1.0e-6 || yradius < 1.0e-6 {
        return p2;
    }
    let q1 = p1 - centre;
    let q2 = p2 - centre;
    let d = q2 - q1;
    let a2 = xradius * xradius;
    let b2 = yradius * yradius;
    let a = d.x * d.x / a2 + d.y * d.y / b2;
    let b = 2.0 * q1.x * d.x / a2 + 2.0 * q1.y * d.y / b2;
    let c = q1.x * q1.x / a2 + q1.y * q1.y / b2 - 1.0;
    let t_to_point = |t: f64| q1 + d * t + centre;

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return p2;
    }
    if disc.abs() < 1.0e-6 {
        return t_to_point(-b / (2.0 * a));
    }
    let disc_rt = disc.sqrt();
    let t1 = (-b + disc_rt) / (2.0 * a);
    let t2 = (-b - disc_rt) / (2.0 * a);
    let t1_ok = (0.0..=1.0).contains(&t1);
    let t2_ok = (0.0..=1.0).contains(&t2);
    let t = match (t1_ok, t2_ok) {
        (true, false) => t1,
        (false, true) => t2,
        (true, true) => t1.min(t2),
        (false, false) => return p2,
    };
    t_to_point(t)
}

/// Crossing point of segments `l1s -> l1f` and `l2s -> l2f`, if any.
/// Parallel segments never cross.
pub fn lines_intersect(l1s: DVec2, l1f: DVec2, l2s: DVec2, l2f: DVec2) -> Option<DVec2> {
    let s1 = l1f - l1s;
    let s2 = l2f - l2s;
    let d = -s2.x * s1.y + s1.x * s2.y;
    if d == 0.0 {
        return None;
    }
    let s = (-s1.y * (l1s.x - l2s.x) + s1.x * (l1s.y - l2s.y)) / d;
    let t = (s2.x * (l1s.y - l2s.y) - s2.y * (l1s.x - l2s.x)) / d;
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(l1s + s1 * t)
    } else {
        None
    }
}

/// Rotate `p` about the origin by `angle` radians, anticlockwise.
pub fn rotate(p: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(p)
}

/// Points on an elliptical arc from `ang1` to `ang2` degrees, in 5 degree
/// steps. The first point is at `ang1`.
pub fn arc_points(centre: DVec2, xradius: f64, yradius: f64, ang1: f64, ang2: f64) -> Vec<DVec2> {
    let num_steps = 1 + ((ang2 - ang1) / 5.0) as i64;
    let num_steps = num_steps.max(1);
    let ang_incr = ((ang2 - ang1) / num_steps as f64).to_radians();
    let start = ang1.to_radians();
    (0..=num_steps)
        .map(|i| {
            let ang = start + i as f64 * ang_incr;
            DVec2::new(centre.x + xradius * ang.cos(), centre.y + yradius * ang.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Atom, Bond, Mol};

    const EPS: f64 = 1e-9;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-6
    }

    fn hexagon() -> Vec<DVec2> {
        (0..6)
            .map(|i| {
                let ang = (i as f64 * 60.0).to_radians();
                DVec2::new(1.5 * ang.cos(), 1.5 * ang.sin())
            })
            .collect()
    }

    fn ring_mol(order: BondOrder) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let atoms: Vec<_> = (0..6).map(|_| mol.add_atom(Atom::new(6))).collect();
        for i in 0..6 {
            mol.add_bond(atoms[i], atoms[(i + 1) % 6], Bond::new(order));
        }
        mol
    }

    #[test]
    fn perpendicular_is_unit_and_left_handed() {
        let p = perpendicular(DVec2::new(0.0, 0.0), DVec2::new(2.0, 0.0));
        assert!((p.length() - 1.0).abs() < EPS);
        assert!(close(p, DVec2::new(0.0, -1.0)));
    }

    #[test]
    fn inner_perpendicular_points_into_angle() {
        let a = DVec2::new(0.0, 0.0);
        let b = DVec2::new(1.0, 0.0);
        let c = DVec2::new(1.5, 1.0);
        let p = inner_perpendicular(a, b, c);
        assert!(p.y > 0.0);
        let c = DVec2::new(1.5, -1.0);
        let p = inner_perpendicular(a, b, c);
        assert!(p.y < 0.0);
    }

    #[test]
    fn terminal_double_bond_is_symmetric() {
        let mut mol = Mol::<Atom, Bond>::new();
        let c = mol.add_atom(Atom::new(6));
        let o = mol.add_atom(Atom::new(8));
        let e = mol.add_bond(c, o, Bond::new(BondOrder::Double));
        let cds = vec![DVec2::new(0.0, 0.0), DVec2::new(1.5, 0.0)];
        let rings = RingInfo::sssr(&mol);
        let ((l1s, l1f), (l2s, l2f)) =
            double_bond_lines(&mol, &rings, 0.15, e, cds[0], cds[1], &cds);
        assert!(close((l1s + l2s) * 0.5, cds[0]));
        assert!(close((l1f + l2f) * 0.5, cds[1]));
        assert!(((l1s - l1f).length() - 1.5).abs() < EPS);
        assert!(((l1s - l2s).length() - 0.3).abs() < EPS);
    }

    #[test]
    fn ring_double_bond_inner_line_points_to_centre() {
        let mol = ring_mol(BondOrder::Aromatic);
        let rings = RingInfo::sssr(&mol);
        let cds = hexagon();
        for e in mol.bonds() {
            let (a, b) = mol.bond_endpoints(e).unwrap();
            let ((l1s, l1f), (l2s, l2f)) = double_bond_lines(
                &mol,
                &rings,
                0.15,
                e,
                cds[a.index()],
                cds[b.index()],
                &cds,
            );
            let outer = (l1s + l1f) * 0.5;
            let inner = (l2s + l2f) * 0.5;
            assert!(inner.length() < outer.length());
            let full = (l1s - l1f).length();
            let short = (l2s - l2f).length();
            assert!((short - 0.7 * full).abs() < 1e-6);
        }
    }

    #[test]
    fn fused_ring_prefers_matching_aromaticity() {
        // Two squares sharing bond 0-1; atoms 2, 3 above, 4, 5 below.
        let mut mol = Mol::<Atom, Bond>::new();
        let n: Vec<_> = (0..6).map(|_| mol.add_atom(Atom::new(6))).collect();
        let shared = mol.add_bond(n[0], n[1], Bond::new(BondOrder::Aromatic));
        mol.add_bond(n[1], n[2], Bond::new(BondOrder::Single));
        mol.add_bond(n[2], n[3], Bond::new(BondOrder::Single));
        mol.add_bond(n[3], n[0], Bond::new(BondOrder::Single));
        mol.add_bond(n[1], n[4], Bond::new(BondOrder::Aromatic));
        mol.add_bond(n[4], n[5], Bond::new(BondOrder::Aromatic));
        mol.add_bond(n[5], n[0], Bond::new(BondOrder::Aromatic));
        let cds = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, -1.0),
            DVec2::new(0.0, -1.0),
        ];
        let rings = RingInfo::sssr(&mol);
        let perp = bond_inside_ring(&mol, &rings, shared, cds[0], cds[1], &cds);
        assert!(perp.y < 0.0, "expected the aromatic ring below, got {perp}");
    }

    #[test]
    fn crossed_double_bond() {
        let mut mol = Mol::<Atom, Bond>::new();
        let n: Vec<_> = (0..4).map(|_| mol.add_atom(Atom::new(6))).collect();
        mol.add_bond(n[0], n[1], Bond::default());
        let mut either = Bond::new(BondOrder::Double);
        either.direction = BondDirection::EitherDouble;
        let e = mol.add_bond(n[1], n[2], either);
        mol.add_bond(n[2], n[3], Bond::default());
        let cds = vec![
            DVec2::new(-1.0, 1.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.5, 0.0),
            DVec2::new(2.5, 1.0),
        ];
        let rings = RingInfo::sssr(&mol);
        let ((l1s, l1f), (l2s, l2f)) =
            double_bond_lines(&mol, &rings, 0.15, e, cds[1], cds[2], &cds);
        assert!(lines_intersect(l1s, l1f, l2s, l2f).is_some());

        let bond = mol.bond_mut(e);
        bond.direction = BondDirection::None;
        bond.stereo = BondStereo::Any;
        let ((l1s, l1f), (l2s, l2f)) =
            double_bond_lines(&mol, &rings, 0.15, e, cds[1], cds[2], &cds);
        assert!(lines_intersect(l1s, l1f, l2s, l2f).is_some());
    }

    #[test]
    fn chain_double_bond_goes_inside_angle() {
        let mut mol = Mol::<Atom, Bond>::new();
        let n: Vec<_> = (0..4).map(|_| mol.add_atom(Atom::new(6))).collect();
        mol.add_bond(n[0], n[1], Bond::default());
        let e = mol.add_bond(n[1], n[2], Bond::new(BondOrder::Double));
        mol.add_bond(n[2], n[3], Bond::default());
        let cds = vec![
            DVec2::new(-1.0, 1.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.5, 0.0),
            DVec2::new(2.5, 1.0),
        ];
        let rings = RingInfo::sssr(&mol);
        let (_, (l2s, l2f)) = double_bond_lines(&mol, &rings, 0.15, e, cds[1], cds[2], &cds);
        assert!(l2s.y > 0.0 && l2f.y > 0.0);
    }

    #[test]
    fn linear_atom_detected() {
        let mut mol = Mol::<Atom, Bond>::new();
        let n: Vec<_> = (0..3).map(|_| mol.add_atom(Atom::new(6))).collect();
        mol.add_bond(n[0], n[1], Bond::new(BondOrder::Double));
        mol.add_bond(n[1], n[2], Bond::new(BondOrder::Double));
        let cds = vec![
            DVec2::new(-1.5, 0.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(1.5, 0.01),
        ];
        assert!(is_linear_atom(&mol, n[1], &cds));
        assert!(!is_linear_atom(&mol, n[0], &cds));
    }

    #[test]
    fn triple_bond_terminal_end_not_truncated() {
        let mut mol = Mol::<Atom, Bond>::new();
        let n: Vec<_> = (0..3).map(|_| mol.add_atom(Atom::new(6))).collect();
        mol.add_bond(n[0], n[1], Bond::default());
        let e = mol.add_bond(n[1], n[2], Bond::new(BondOrder::Triple));
        let c1 = DVec2::new(0.0, 0.0);
        let c2 = DVec2::new(1.0, 0.0);
        let ((l1s, l1f), (l2s, l2f)) = triple_bond_lines(&mol, 0.15, e, c1, c2);
        assert!((l1s.x - 0.15).abs() < EPS);
        assert!((l1f.x - 1.0).abs() < EPS);
        assert!((l1s.y + l2s.y).abs() < EPS);
        assert!((l1f.y + l2f.y).abs() < EPS);
        assert!((l1s.y.abs() - 0.3).abs() < EPS);
    }

    #[test]
    fn ellipse_clip_nearest_start() {
        let p = ellipse_line_intersection(
            DVec2::ZERO,
            1.0,
            1.0,
            DVec2::new(-2.0, 0.0),
            DVec2::new(0.0, 0.0),
        );
        assert!(close(p, DVec2::new(-1.0, 0.0)));
    }

    #[test]
    fn ellipse_miss_leaves_end() {
        let p2 = DVec2::new(3.0, 5.0);
        let p = ellipse_line_intersection(DVec2::ZERO, 1.0, 1.0, DVec2::new(-3.0, 5.0), p2);
        assert_eq!(p, p2);
        let p = ellipse_line_intersection(DVec2::ZERO, 0.0, 1.0, DVec2::new(-3.0, 0.0), p2);
        assert_eq!(p, p2);
    }

    #[test]
    fn segments_cross_and_parallel() {
        let ip = lines_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
            DVec2::new(2.0, 0.0),
        );
        assert!(close(ip.unwrap(), DVec2::new(1.0, 1.0)));
        assert!(lines_intersect(
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(0.0, 1.0),
            DVec2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn arc_starts_at_first_angle() {
        let pts = arc_points(DVec2::ZERO, 1.0, 1.0, 0.0, 90.0);
        assert!(close(pts[0], DVec2::new(1.0, 0.0)));
        assert!(close(*pts.last().unwrap(), DVec2::new(0.0, 1.0)));
        assert_eq!(pts.len(), 20);
    }

    #[test]
    fn rotation_is_anticlockwise() {
        let p = rotate(DVec2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2);
        assert!(close(p, DVec2::new(0.0, 1.0)));
    }
}
