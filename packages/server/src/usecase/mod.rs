//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod connect_participant;
pub mod create_message;
pub mod disconnect_participant;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod post_to_room;
mod room_access;
pub mod session;
pub mod update_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_message::CreateMessageUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, CreateMessageError, RoomAccessError, UpdateMessageError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use post_to_room::PostToRoomUseCase;
pub use session::ParticipantSession;
pub use update_message::UpdateMessageUseCase;
