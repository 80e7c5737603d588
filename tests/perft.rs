//! Cross-checks move generation against the `chess` crate.

use std::collections::BTreeSet;
use std::str::FromStr;

use chess::{Board as ReferenceBoard, File, MoveGen, Rank, Square};

use chess_game_server::game::attacks::all_legal_moves;
use chess_game_server::game::movegen::requires_promotion;
use chess_game_server::game::{apply_move, legal_moves, Board, Color, Position, PromotionChoice};

const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTIONS: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";

const ALL_PROMOTIONS: [PromotionChoice; 4] = [
    PromotionChoice::Queen,
    PromotionChoice::Rook,
    PromotionChoice::Bishop,
    PromotionChoice::Knight,
];

fn load(fen: &str) -> (Board, Color, ReferenceBoard) {
    let mut fields = fen.split_whitespace();
    let board = Board::from_placement(fields.next().unwrap()).unwrap();
    let color = match fields.next() {
        Some("b") => Color::Black,
        _ => Color::White,
    };
    (board, color, ReferenceBoard::from_str(fen).unwrap())
}

fn perft(board: &Board, color: Color, depth: u32) -> usize {
    if depth == 0 {
        return 1;
    }
    let mut nodes = 0;
    for (from, targets) in all_legal_moves(board, color) {
        for to in targets {
            let choices: &[PromotionChoice] = if requires_promotion(board, from, to) {
                &ALL_PROMOTIONS
            } else {
                &ALL_PROMOTIONS[..1]
            };
            for choice in choices {
                let mut next = board.clone();
                apply_move(&mut next, from, to, *choice).unwrap();
                nodes += perft(&next, color.opponent(), depth - 1);
            }
        }
    }
    nodes
}

fn to_square(position: Position) -> Square {
    Square::make_square(
        Rank::from_index(7 - position.rank()),
        File::from_index(position.file()),
    )
}

fn to_position(square: Square) -> Position {
    Position::new(
        7 - square.get_rank().to_index() as i64,
        square.get_file().to_index() as i64,
    )
    .unwrap()
}

#[test]
fn starting_position_node_counts() {
    let (board, color, _) = load(START);
    assert_eq!(perft(&board, color, 1), 20);
    assert_eq!(perft(&board, color, 2), 400);
    assert_eq!(perft(&board, color, 3), 8902);
}

#[test]
fn kiwipete_node_counts() {
    let (board, color, _) = load(KIWIPETE);
    assert_eq!(perft(&board, color, 1), 48);
    assert_eq!(perft(&board, color, 2), 2039);
}

#[test]
fn node_counts_agree_with_reference() {
    for (fen, depth) in [(START, 3), (KIWIPETE, 2), (ENDGAME, 3), (PROMOTIONS, 2)] {
        let (board, color, reference) = load(fen);
        assert_eq!(
            perft(&board, color, depth as u32),
            MoveGen::movegen_perft_test(&reference, depth),
            "{} at depth {}",
            fen,
            depth
        );
    }
}

#[test]
fn destinations_agree_with_reference_per_square() {
    for fen in [START, KIWIPETE, ENDGAME, PROMOTIONS] {
        let (board, color, reference) = load(fen);
        for (from, _) in board.pieces_of(color) {
            let source = to_square(from);
            let expected: BTreeSet<Position> = MoveGen::new_legal(&reference)
                .filter(|m| m.get_source() == source)
                .map(|m| to_position(m.get_dest()))
                .collect();
            assert_eq!(legal_moves(&board, from), expected, "{} from {}", fen, from);
        }
    }
}
