//! Tic-tac-toe: the reference game module for the Parlor runtime.

use parlor::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Cell marks: 0 = empty, 1 = X (first player), 2 = O (second player).
type Mark = u8;

const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2], [3, 4, 5], [6, 7, 8], // rows
    [0, 3, 6], [1, 4, 7], [2, 5, 8], // columns
    [0, 4, 8], [2, 4, 6], // diagonals
];

pub struct TicTacToe;

impl Game for TicTacToe {
    fn info(&self) -> GameInfo {
        GameInfo {
            name: "tictactoe".into(),
            min_players: 2,
            max_players: 2,
        }
    }

    fn new_match(&self, config: MatchConfig) -> Box<dyn Match> {
        Box::new(TicTacToeMatch {
            players: [config.player_ids[0].clone(), config.player_ids[1].clone()],
            board: [0; 9],
            turn: 0,
            done: false,
            winner: -1,
        })
    }
}

/// One tic-tac-toe match. The struct itself is the durable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicTacToeMatch {
    players: [String; 2],
    board: [Mark; 9],
    /// Index into `players` of whoever moves next.
    turn: usize,
    done: bool,
    /// Winner index, or -1 for a draw. Meaningful only when `done`.
    winner: i8,
}

#[derive(Debug, Serialize, Deserialize)]
struct MovePayload {
    cell: usize,
}

impl TicTacToeMatch {
    fn mark_wins(&self, mark: Mark) -> bool {
        WIN_LINES
            .iter()
            .any(|line| line.iter().all(|&i| self.board[i] == mark))
    }

    fn board_full(&self) -> bool {
        self.board.iter().all(|&c| c != 0)
    }
}

impl Match for TicTacToeMatch {
    fn state(&self, player_id: &str) -> Value {
        let you: Mark = if player_id == self.players[1] { 2 } else { 1 };
        let winner = if !self.done {
            None
        } else if self.winner < 0 {
            Some("draw".to_string())
        } else {
            Some(self.players[self.winner as usize].clone())
        };
        let mut view = json!({
            "board": self.board,
            "turn": self.players[self.turn],
            "you": you,
            "players": self.players,
            "done": self.done,
        });
        if let Some(winner) = winner {
            view["winner"] = Value::String(winner);
        }
        view
    }

    fn valid_actions(&self, player_id: &str) -> Vec<Action> {
        if self.done || player_id != self.players[self.turn] {
            return Vec::new();
        }
        self.board
            .iter()
            .enumerate()
            .filter(|(_, &mark)| mark == 0)
            .map(|(cell, _)| Action {
                kind: "move".into(),
                payload: json!({ "cell": cell }),
            })
            .collect()
    }

    fn apply_action(&mut self, player_id: &str, action: Action) -> Result<(), String> {
        if self.done {
            return Err("game is over".into());
        }
        if player_id != self.players[self.turn] {
            return Err("not your turn".into());
        }
        if action.kind != "move" {
            return Err(format!("unknown action type: {}", action.kind));
        }
        let mv: MovePayload = serde_json::from_value(action.payload)
            .map_err(|e| format!("invalid move payload: {e}"))?;
        if mv.cell > 8 {
            return Err(format!("cell {} out of range", mv.cell));
        }
        if self.board[mv.cell] != 0 {
            return Err(format!("cell {} already occupied", mv.cell));
        }

        let mark = self.turn as Mark + 1;
        self.board[mv.cell] = mark;
        if self.mark_wins(mark) {
            self.done = true;
            self.winner = self.turn as i8;
        } else if self.board_full() {
            self.done = true;
            self.winner = -1;
        } else {
            self.turn = 1 - self.turn;
        }
        Ok(())
    }

    fn is_over(&self) -> bool {
        self.done
    }

    fn results(&self) -> Vec<PlayerResult> {
        if !self.done {
            return Vec::new();
        }
        if self.winner < 0 {
            return self
                .players
                .iter()
                .map(|id| PlayerResult {
                    player_id: id.clone(),
                    rank: 1,
                    score: 0,
                })
                .collect();
        }
        let winner = self.winner as usize;
        vec![
            PlayerResult {
                player_id: self.players[winner].clone(),
                rank: 1,
                score: 1,
            },
            PlayerResult {
                player_id: self.players[1 - winner].clone(),
                rank: 2,
                score: 0,
            },
        ]
    }

    fn save(&self) -> Result<Vec<u8>, GameError> {
        serde_json::to_vec(self).map_err(GameError::Serialize)
    }

    fn load(&mut self, bytes: &[u8]) -> Result<(), GameError> {
        *self = serde_json::from_slice(bytes).map_err(GameError::Deserialize)?;
        Ok(())
    }
}
