//! Room construction: master meshes, furniture placement, the chess board,
//! and where the missing pieces are hidden.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec3;

use crate::collide::Aabb;
use crate::scene::{Material, MeshId, ObjectId, PieceSet, Scene, SceneError, SceneObject};

/// OBJ models loaded from the asset directory, keyed by master name.
/// The plane, box, and sphere masters are generated procedurally.
pub const MODEL_FILES: &[(&str, &str)] = &[
    ("bunny", "bunny.obj"),
    ("table", "table.obj"),
    ("chess_board", "chess_board.obj"),
    ("rook", "rook.obj"),
    ("knight", "knight.obj"),
    ("bishop", "bishop.obj"),
    ("queen", "queen.obj"),
    ("king", "king.obj"),
    ("pawn", "pawn.obj"),
    ("bowl", "bowl.obj"),
    ("console_table", "console_table.obj"),
    ("drawer_left", "drawer_left.obj"),
    ("drawer_right", "drawer_right.obj"),
    ("sofa", "sofa.obj"),
    ("tv", "tv.obj"),
    ("shelf", "shelf.obj"),
    ("chair", "chair.obj"),
    ("bed", "bed.obj"),
    ("bookshelf", "bookshelf.obj"),
    ("beam_bag", "beam_bag.obj"),
];

/// Master meshes available for stamping instances.
#[derive(Debug, Default)]
pub struct MasterSet {
    entries: HashMap<String, (MeshId, Aabb)>,
}

impl MasterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, mesh: MeshId, bounds: Aabb) {
        self.entries.insert(name.into(), (mesh, bounds));
    }

    /// Stamps a new instance of a master under the given instance name.
    pub fn stamp(
        &self,
        master: &str,
        name: impl Into<String>,
    ) -> Result<SceneObject, SceneError> {
        let (mesh, bounds) = self
            .entries
            .get(master)
            .copied()
            .ok_or_else(|| SceneError::MasterNotFound(master.to_owned()))?;
        Ok(SceneObject::new(name, mesh, bounds))
    }
}

/// Everything the game plays in.
#[derive(Debug)]
pub struct Level {
    pub scene: Scene,
    pub pieces: PieceSet,
    pub player: ObjectId,
    /// Objects movement tests against; also the pick candidates.
    pub collision_group: Vec<ObjectId>,
}

pub const PIECE_HEIGHT: f32 = 0.23;
const PIECE_SCALE: f32 = 0.007;

/// Board coordinates: files run along X from the white king's right,
/// ranks along Z.
const FILE_X: [f32; 8] = [-3.33, -3.465, -3.60, -3.735, -3.87, -4.005, -4.14, -4.275];
const WHITE_BACK_Z: f32 = -4.37;
const BLACK_BACK_Z: f32 = -3.42;
const WHITE_PAWN_Z: f32 = -4.24;
const BLACK_PAWN_Z: f32 = -3.55;

/// Builds the furnished room, the set-up chess board, and the hidden-piece
/// placements from a set of master meshes.
pub fn furnish(masters: &MasterSet) -> Result<Level, SceneError> {
    let mut scene = Scene::new();

    let player = scene.add(masters.stamp("sphere", "player")?.inspectable(false));

    let mut floor = masters
        .stamp("plane", "floor")?
        .collidable(false)
        .inspectable(false)
        .material(Material::Floor);
    floor.set_position(Vec3::new(0.0, -1.0, 0.0));
    floor.scale(Vec3::new(10.0, 1.0, 8.0));
    scene.add(floor);

    let mut ceiling = masters
        .stamp("plane", "ceiling")?
        .collidable(false)
        .inspectable(false)
        .material(Material::Wall);
    ceiling.set_position(Vec3::new(0.0, 3.7, 0.0));
    ceiling.scale(Vec3::new(10.0, 1.0, 8.0));
    ceiling.rotate_xyz(Vec3::new(PI, 0.0, 0.0));
    scene.add(ceiling);

    for (name, rotated, position) in [
        ("wall_north", false, Vec3::new(0.0, 1.0, -8.0)),
        ("wall_west", true, Vec3::new(-10.0, 1.0, 0.0)),
        ("wall_south", false, Vec3::new(0.0, 1.0, 8.0)),
        ("wall_east", true, Vec3::new(10.0, 1.0, 0.0)),
    ] {
        let mut wall = masters
            .stamp("box", name)?
            .inspectable(false)
            .material(Material::Wall);
        if rotated {
            wall.rotate_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0));
        }
        wall.scale(Vec3::new(8.0, 4.0, 0.5));
        wall.set_position(position);
        scene.add(wall);
    }

    let mut bunny = masters.stamp("bunny", "bunny")?;
    bunny.scale(Vec3::splat(0.3));
    bunny.set_position(Vec3::new(5.5, 0.25, -6.0));
    scene.add(bunny);

    let mut bowl = masters
        .stamp("bowl", "bowl")?
        .material(Material::Ceramic);
    bowl.scale(Vec3::splat(0.04));
    bowl.rotate_xyz(Vec3::new(-FRAC_PI_2, 0.0, 0.0));
    bowl.set_position(Vec3::new(-6.0, 0.2, -4.0));
    scene.add(bowl);

    let mut table = masters.stamp("table", "table")?.material(Material::Wood);
    table.scale(Vec3::splat(1.5));
    table.set_position(Vec3::new(-5.0, -0.4, -4.0));
    scene.add(table);

    let mut board = masters
        .stamp("chess_board", "chess_board")?
        .material(Material::Wood);
    board.scale(Vec3::splat(0.03));
    board.set_position(Vec3::new(-3.8, 0.2, -3.9));
    scene.add(board);

    place_pieces(masters, &mut scene)?;

    let mut console = masters
        .stamp("console_table", "console_table")?
        .inspectable(false)
        .material(Material::Wood);
    console.scale(Vec3::new(3.0, 2.5, 2.5));
    console.set_position(Vec3::new(5.0, -1.0, -6.0));
    scene.add(console);

    let mut sofa = masters.stamp("sofa", "sofa")?
        .inspectable(false)
        .material(Material::Fabric);
    sofa.scale(Vec3::new(0.002, 0.002, 0.0018));
    sofa.set_position(Vec3::new(1.0, -1.0, 2.0));
    sofa.rotate_xyz(Vec3::new(0.0, -FRAC_PI_2, 0.0));
    scene.add(sofa);

    let mut shelf = masters
        .stamp("shelf", "shelf")?
        .inspectable(false)
        .material(Material::Wood);
    shelf.scale(Vec3::new(7.0, 5.5, 5.5));
    shelf.set_position(Vec3::new(-9.0, -1.0, 1.2));
    shelf.rotate_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0));
    scene.add(shelf);

    let mut tv = masters.stamp("tv", "tv")?;
    tv.scale(Vec3::splat(0.5));
    tv.set_position(Vec3::new(-9.0, 0.5, 1.2));
    tv.rotate_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0));
    scene.add(tv);

    let mut chair = masters.stamp("chair", "chair")?.material(Material::Wood);
    chair.scale(Vec3::splat(2.2));
    chair.set_position(Vec3::new(-3.8, -1.0, -6.0));
    scene.add(chair);

    let mut shelf_bunny = masters.stamp("bunny", "shelf_bunny")?;
    shelf_bunny.scale(Vec3::splat(0.5));
    shelf_bunny.rotate_xyz(Vec3::new(0.0, FRAC_PI_2, 0.0));
    shelf_bunny.set_position(Vec3::new(-9.0, -0.5, 1.2));
    scene.add(shelf_bunny);

    for (name, z) in [("shelf_sphere_front", 2.6), ("shelf_sphere_back", -0.2)] {
        let mut sphere = masters.stamp("sphere", name)?;
        sphere.scale(Vec3::splat(0.5));
        sphere.set_position(Vec3::new(-9.0, -0.5, z));
        scene.add(sphere);
    }

    let mut bed = masters.stamp("bed", "bed")?.material(Material::Fabric);
    bed.scale(Vec3::splat(0.013));
    bed.rotate_xyz(Vec3::new(0.0, -FRAC_PI_2, 0.0));
    bed.set_position(Vec3::new(8.0, -1.0, -5.0));
    scene.add(bed);

    let mut bookshelf = masters
        .stamp("bookshelf", "bookshelf")?
        .inspectable(false)
        .material(Material::Wood);
    bookshelf.scale(Vec3::splat(2.0));
    bookshelf.rotate_xyz(Vec3::new(0.0, PI, 0.0));
    bookshelf.set_position(Vec3::new(-6.5, -1.0, 7.0));
    scene.add(bookshelf);

    for (name, position) in [
        ("books_bottom", Vec3::new(-7.2, 0.38, 7.0)),
        ("books_middle", Vec3::new(-7.0, 1.32, 7.0)),
        ("books_top", Vec3::new(-7.2, 2.22, 7.0)),
    ] {
        let mut books = masters.stamp("box", name)?.material(Material::Wood);
        books.scale(Vec3::new(0.6, 0.35, 0.4));
        books.set_position(position);
        scene.add(books);
    }

    for name in ["drawer_left", "drawer_right"] {
        let mut drawer = masters.stamp(name, name)?.material(Material::Wood);
        drawer.scale(Vec3::new(3.0, 2.5, 2.5));
        drawer.set_position(Vec3::new(5.0, -1.0, -6.0));
        scene.add(drawer);
    }

    let mut beam_bag = masters
        .stamp("beam_bag", "beam_bag")?
        .material(Material::Fabric)
        .sphere_collider(1.0);
    beam_bag.rotate_xyz(Vec3::new(0.0, PI / 1.5, 0.0));
    beam_bag.set_position(Vec3::new(7.5, -1.0, 5.5));
    scene.add(beam_bag);

    // Rest transforms are recorded with the board fully set up, before any
    // piece is hidden.
    let piece_names: Vec<String> = scene
        .objects()
        .iter()
        .filter(|o| o.is_piece())
        .map(|o| o.name.clone())
        .collect();
    let mut pieces = PieceSet::new();
    for name in &piece_names {
        let id = scene.id_of(name)?;
        pieces.record(&scene, id);
    }

    let collision_group = [
        "floor",
        "wall_north",
        "wall_west",
        "wall_south",
        "wall_east",
        "table",
        "bunny",
        "chess_board",
        "bowl",
        "black_king",
        "black_queen",
        "console_table",
        "white_king",
        "white_queen",
        "g_black_pawn",
        "left_white_rook",
        "right_black_rook",
        "sofa",
        "shelf",
        "tv",
        "chair",
        "shelf_bunny",
        "shelf_sphere_front",
        "shelf_sphere_back",
        "bed",
        "bookshelf",
        "books_bottom",
        "books_middle",
        "drawer_left",
        "drawer_right",
        "beam_bag",
    ]
    .iter()
    .map(|name| scene.id_of(name))
    .collect::<Result<Vec<_>, _>>()?;

    hide_pieces(&mut scene)?;

    Ok(Level {
        scene,
        pieces,
        player,
        collision_group,
    })
}

/// Sets up all 32 pieces on the board. "Left" and "right" are from the
/// white player's seat, so the right rook sits on the first file.
fn place_pieces(masters: &MasterSet, scene: &mut Scene) -> Result<(), SceneError> {
    let back_row: [(&str, &str); 8] = [
        ("rook", "right_rook"),
        ("knight", "right_knight"),
        ("bishop", "right_bishop"),
        ("queen", "queen"),
        ("king", "king"),
        ("bishop", "left_bishop"),
        ("knight", "left_knight"),
        ("rook", "left_rook"),
    ];

    for (color, back_z, pawn_z, material) in [
        ("white", WHITE_BACK_Z, WHITE_PAWN_Z, Material::WhitePiece),
        ("black", BLACK_BACK_Z, BLACK_PAWN_Z, Material::BlackPiece),
    ] {
        for (file, (master, role)) in back_row.iter().enumerate() {
            let name = if role.contains('_') {
                let (side, kind) = role.split_once('_').unwrap_or(("", role));
                format!("{side}_{color}_{kind}")
            } else {
                format!("{color}_{role}")
            };
            let mut piece = masters.stamp(master, name)?.material(material);
            piece.scale(Vec3::splat(PIECE_SCALE));
            piece.set_position(Vec3::new(FILE_X[file], PIECE_HEIGHT, back_z));
            scene.add(piece);
        }

        for (file, &x) in FILE_X.iter().enumerate() {
            let file_letter = (b'a' + file as u8) as char;
            let mut pawn = masters
                .stamp("pawn", format!("{file_letter}_{color}_pawn"))?
                .material(material);
            pawn.scale(Vec3::splat(PIECE_SCALE));
            pawn.set_position(Vec3::new(x, PIECE_HEIGHT, pawn_z));
            scene.add(pawn);
        }
    }
    Ok(())
}

/// Scatters the missing pieces around the room. Three go inside containers
/// (bowl, left drawer, under the chair); the rest lie in the open.
fn hide_pieces(scene: &mut Scene) -> Result<(), SceneError> {
    let h = PIECE_HEIGHT;

    scene
        .get_mut("black_king")?
        .set_position(Vec3::new(4.5, h + 0.4, -6.0));
    scene
        .get_mut("black_queen")?
        .set_position(Vec3::new(-5.5, h, -3.3));

    let pawn = scene.get_mut("g_black_pawn")?;
    pawn.set_position(Vec3::new(-0.8, h - 0.3, 4.6));
    pawn.rotate_xyz(Vec3::new(FRAC_PI_2, 0.0, FRAC_PI_2));

    let king = scene.get_mut("white_king")?;
    king.set_position(Vec3::new(-6.0, h + 0.1, -3.90));
    king.rotate_xyz(Vec3::new(-FRAC_PI_2, 0.0, 0.0));

    scene
        .get_mut("white_queen")?
        .set_position(Vec3::new(5.0, h - 0.3, -5.8));
    scene
        .get_mut("left_white_rook")?
        .set_position(Vec3::new(-6.2, h - 0.1, 6.8));
    scene
        .get_mut("right_black_rook")?
        .set_position(Vec3::new(-6.0, h - 0.1, 6.8));

    let bishop = scene.get_mut("left_white_bishop")?;
    bishop.set_position(Vec3::new(-3.8, -0.12, -6.0));
    bishop.rotate_xyz(Vec3::new(FRAC_PI_2, FRAC_PI_2, 0.0));

    Ok(())
}

/// Names of the pieces that start away from the board.
pub const HIDDEN_PIECES: [&str; 8] = [
    "black_king",
    "black_queen",
    "g_black_pawn",
    "white_king",
    "white_queen",
    "left_white_rook",
    "right_black_rook",
    "left_white_bishop",
];

#[cfg(test)]
pub(crate) fn test_masters() -> MasterSet {
    let mut masters = MasterSet::new();
    let names = [
        "plane", "sphere", "box", "bunny", "table", "chess_board", "rook", "knight", "bishop",
        "queen", "king", "pawn", "bowl", "console_table", "drawer_left", "drawer_right", "sofa",
        "tv", "shelf", "chair", "bed", "bookshelf", "beam_bag",
    ];
    for (i, name) in names.iter().enumerate() {
        let bounds = match *name {
            "plane" => Aabb::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0)),
            // Keep the tabletop below the props standing on it, the way the
            // real mesh bounds do.
            "table" => Aabb::new(Vec3::splat(-1.0), Vec3::new(1.0, 0.35, 1.0)),
            _ => Aabb::symmetric(1.0),
        };
        masters.insert(*name, MeshId(i), bounds);
    }
    masters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_full_board_is_recorded() {
        let level = furnish(&test_masters()).unwrap();
        assert_eq!(level.pieces.members().len(), 32);
        assert_eq!(
            level.pieces.rest_position("e_white_pawn").unwrap(),
            Vec3::new(-3.87, PIECE_HEIGHT, -4.24)
        );
        assert_eq!(
            level.pieces.rest_position("white_king").unwrap(),
            Vec3::new(-3.87, PIECE_HEIGHT, WHITE_BACK_Z)
        );
        assert_eq!(
            level.pieces.rest_position("left_white_rook").unwrap(),
            Vec3::new(-4.275, PIECE_HEIGHT, WHITE_BACK_Z)
        );
    }

    #[test]
    fn hidden_pieces_start_away_from_rest() {
        let level = furnish(&test_masters()).unwrap();
        assert!(!level.pieces.all_at_rest(&level.scene));
        for name in HIDDEN_PIECES {
            let rest = level.pieces.rest_position(name).unwrap();
            let now = level.scene.get(name).unwrap().position();
            assert_ne!(rest, now, "{name} was not hidden");
        }
        // A piece that was never hidden still sits on its square.
        let rest = level.pieces.rest_position("d_white_pawn").unwrap();
        assert_eq!(level.scene.get("d_white_pawn").unwrap().position(), rest);
    }

    #[test]
    fn returning_every_hidden_piece_completes_the_board() {
        let mut level = furnish(&test_masters()).unwrap();
        for name in HIDDEN_PIECES {
            let rest = level.pieces.rest_model(name).unwrap();
            level.scene.get_mut(name).unwrap().model = rest;
        }
        assert!(level.pieces.all_at_rest(&level.scene));
    }

    #[test]
    fn completed_board_plays_the_endgame() {
        let mut level = furnish(&test_masters()).unwrap();
        for name in HIDDEN_PIECES {
            let rest = level.pieces.rest_model(name).unwrap();
            level.scene.get_mut(name).unwrap().model = rest;
        }
        assert!(level.pieces.all_at_rest(&level.scene));

        let mut script = crate::anim::EndgameScript::new();
        let dt = 1.0 / 60.0;
        while !script.game_over() && script.elapsed() < 18.0 {
            script.update(dt, &mut level.scene).unwrap();
        }
        assert!(script.game_over());
        // The queen's move pulled the board out of the rest layout again.
        assert!(!level.pieces.all_at_rest(&level.scene));
    }

    #[test]
    fn collision_group_membership() {
        let level = furnish(&test_masters()).unwrap();
        let group_names: Vec<&str> = level
            .collision_group
            .iter()
            .map(|&id| level.scene.object(id).name.as_str())
            .collect();
        assert!(group_names.contains(&"wall_north"));
        assert!(group_names.contains(&"beam_bag"));
        // The ceiling is deliberately absent so debug flight can leave.
        assert!(!group_names.contains(&"ceiling"));
        assert!(!group_names.contains(&"player"));
        // The top book stack is not part of the group either.
        assert!(!group_names.contains(&"books_top"));
    }

    #[test]
    fn flags_and_colliders_match_the_layout() {
        let level = furnish(&test_masters()).unwrap();
        let scene = &level.scene;
        assert!(!scene.get("floor").unwrap().collidable);
        assert!(!scene.get("sofa").unwrap().inspectable);
        assert!(scene.get("table").unwrap().inspectable);
        assert!(matches!(
            scene.get("beam_bag").unwrap().collider,
            crate::scene::Collider::Sphere { radius } if radius == 1.0
        ));
        assert!(scene.get("e_white_pawn").unwrap().is_piece());
        assert!(!scene.get("player").unwrap().inspectable);
    }
}
