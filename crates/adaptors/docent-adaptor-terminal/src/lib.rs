//! Interactive terminal chat for docent
//!
//! A blocking prompt/read loop over the streaming API client. Answers are
//! printed as they stream in; rooms, index selection, ratings and the
//! custom prompt are driven with slash commands.

use std::io::{self, Write};

use docent_client::ApiClient;
use docent_core::framing::StreamEvent;
use docent_core::types::{
    ChatMessageRequest, ChatRole, ChatRoom, CoreConfig, Evaluation, IndexTypeDetail,
};
use docent_core::{ChatSession, DocentError, Result, RoomStore};
use tracing::debug;

pub mod commands;
pub mod render;

use commands::{Command, IndexSelection, PromptArg};

/// Shown when a stream fails after it started
const FAILURE_MESSAGE: &str = "Failed to retrieve the answer. Please try again.";

/// Shown when the backend rejects the session mid-conversation
const SESSION_EXPIRED_MESSAGE: &str =
    "Your session has expired. Run `run-docent login` and try again.";

/// Shell settings supplied by the binary
#[derive(Clone, Default)]
pub struct ShellConfig {
    /// Model override; the server default applies when unset
    pub model: Option<String>,
}

/// The interactive chat shell
pub struct ChatShell {
    client: ApiClient,
    config: ShellConfig,
    core: CoreConfig,
    rooms: RoomStore,
    session: ChatSession,
    active_room: Option<ChatRoom>,
    selected_indexes: Vec<IndexTypeDetail>,
    model: String,
    prompt_active: bool,
}

impl ChatShell {
    pub fn new(client: ApiClient, config: ShellConfig) -> Self {
        Self {
            client,
            config,
            core: CoreConfig::default(),
            rooms: RoomStore::new(),
            session: ChatSession::new(),
            active_room: None,
            selected_indexes: Vec::new(),
            model: String::new(),
            prompt_active: false,
        }
    }

    /// Run the shell until `/quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        let status = self.client.maintenance_status().await?;
        if status.maintenance {
            if status.message.is_empty() {
                println!("The service is down for maintenance. Please come back later.");
            } else {
                println!("{}", status.message);
            }
            return Ok(());
        }

        self.core = self.client.core_config().await?;
        self.model = self
            .config
            .model
            .clone()
            .or_else(|| self.core.default_model.clone())
            .or_else(|| self.core.model_list.first().cloned())
            .unwrap_or_default();
        self.selected_indexes = self.all_index_details();

        if self.core.name.is_empty() {
            println!("docent interactive chat");
        } else {
            println!("{} interactive chat", self.core.name);
        }
        println!("Type /help for commands, /quit to leave.\n");

        let rooms = self.client.list_chat_rooms().await?;
        self.rooms.replace_all(rooms);
        let first_room = self.rooms.iter_display().next().cloned();
        match first_room {
            Some(room) => self.open_room(room).await,
            None => self.create_room().await,
        }

        loop {
            print!("You: ");
            io::stdout().flush()?;

            let mut input = String::new();
            if io::stdin().read_line(&mut input)? == 0 {
                break;
            }
            let input = input.trim();
            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match commands::parse(input) {
                    Ok(command) => {
                        if !self.dispatch(command).await {
                            break;
                        }
                    }
                    Err(usage) => println!("{}", usage),
                }
            } else {
                self.send_message(input).await;
            }
            println!();
        }

        println!("bye.");
        Ok(())
    }

    /// Handle one command; false ends the shell
    async fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Rooms => self.print_rooms(),
            Command::Open(n) => match self.room_by_number(n).cloned() {
                Some(room) => self.open_room(room).await,
                None => println!("no room {}", n),
            },
            Command::New => self.create_room().await,
            Command::Rename(name) => self.rename_room(&name).await,
            Command::Delete(number) => self.delete_room(number).await,
            Command::Search(query) => self.print_search(&query),
            Command::Indexes => self.print_indexes(),
            Command::Use(selection) => self.select_indexes(selection),
            Command::Model(name) => self.switch_model(name),
            Command::Prompt(arg) => self.set_prompt(arg).await,
            Command::Good => self.evaluate(Evaluation::Good).await,
            Command::Bad => self.evaluate(Evaluation::Bad).await,
            Command::History => self.print_history(),
            Command::Whoami => self.whoami().await,
            Command::Help => println!("{}", commands::HELP),
            Command::Quit => return false,
        }
        true
    }

    async fn send_message(&mut self, text: &str) {
        let room = match self.active_room.clone() {
            Some(room) => room,
            None => {
                println!("no room open. /new creates one.");
                return;
            }
        };
        let first_message = self.session.turns().is_empty();
        let chat_history = self.session.history();
        self.session.begin_exchange(text);

        let request = ChatMessageRequest {
            chat_room_id: room.id.clone(),
            message: text.to_string(),
            assistant_prompt: room.custom_prompt.clone().filter(|_| self.prompt_active),
            is_active_assistant_prompt: self.prompt_active && room.custom_prompt.is_some(),
            chat_history,
            index_type: self.selected_indexes.iter().map(|d| d.id.clone()).collect(),
            index_type_details: self.selected_indexes.clone(),
            model: self.model.clone(),
        };

        print!("Assistant: ");
        let _ = io::stdout().flush();

        let client = self.client.clone();
        let session = &mut self.session;
        let result = client
            .send_chat_message(&request, |event| {
                session.apply(event);
                if let StreamEvent::AnswerDelta(delta) = event {
                    print!("{}", delta);
                    let _ = io::stdout().flush();
                }
            })
            .await;

        match result {
            Ok(outcome) => {
                println!();
                for line in render::reference_lines(&outcome.references) {
                    println!("{}", line);
                }
                if let Some(tokens) = outcome.token_usage {
                    println!("  tokens used: {}", tokens);
                }
                if first_message {
                    self.autoname_room(&room.id, text).await;
                }
            }
            Err(e) => {
                println!();
                let line = match &e {
                    DocentError::Api { detail, .. } => detail.clone(),
                    DocentError::Unauthorized { .. } => SESSION_EXPIRED_MESSAGE.to_string(),
                    _ => FAILURE_MESSAGE.to_string(),
                };
                self.session.fail(line.clone());
                println!("{}", line);
            }
        }
    }

    /// Name a fresh room after its first message
    async fn autoname_room(&mut self, room_id: &str, message: &str) {
        let name = render::auto_room_name(message);
        if name.is_empty() {
            return;
        }
        match self.client.update_chat_room(room_id, Some(&name), None).await {
            Ok(updated) => {
                self.rooms.upsert(updated.clone());
                self.active_room = Some(updated);
            }
            Err(e) => debug!(error = %e, "auto-rename failed"),
        }
    }

    async fn open_room(&mut self, room: ChatRoom) {
        match self.client.list_chat_messages(&room.id).await {
            Ok(messages) => {
                self.session = ChatSession::from_messages(messages);
                self.prompt_active = room.is_active_custom_prompt.unwrap_or(false);
                println!(
                    "opened {} ({} messages)",
                    room.name,
                    self.session.turns().len()
                );
                self.active_room = Some(room);
            }
            Err(e) => println!("could not open {}: {}", room.name, e.user_message()),
        }
    }

    async fn create_room(&mut self) {
        match self.client.create_chat_room().await {
            Ok(room) => {
                self.rooms.push(room.clone());
                self.session = ChatSession::new();
                self.prompt_active = room.is_active_custom_prompt.unwrap_or(false);
                println!("created {}", room.name);
                self.active_room = Some(room);
            }
            Err(e) => println!("could not create a room: {}", e.user_message()),
        }
    }

    async fn rename_room(&mut self, name: &str) {
        let room_id = match &self.active_room {
            Some(room) => room.id.clone(),
            None => {
                println!("no room open.");
                return;
            }
        };
        match self.client.update_chat_room(&room_id, Some(name), None).await {
            Ok(updated) => {
                self.rooms.upsert(updated.clone());
                println!("renamed to {}", updated.name);
                self.active_room = Some(updated);
            }
            Err(e) => println!("rename failed: {}", e.user_message()),
        }
    }

    /// Optimistic delete: the room disappears immediately and is put back
    /// at its original position when the backend refuses.
    async fn delete_room(&mut self, number: Option<usize>) {
        let target = match number {
            Some(n) => match self.room_by_number(n) {
                Some(room) => room.id.clone(),
                None => {
                    println!("no room {}", n);
                    return;
                }
            },
            None => match &self.active_room {
                Some(room) => room.id.clone(),
                None => {
                    println!("no room open.");
                    return;
                }
            },
        };

        let snapshot = match self.rooms.remove(&target) {
            Some(snapshot) => snapshot,
            None => {
                println!("no such room.");
                return;
            }
        };
        let name = snapshot.room.name.clone();

        match self.client.delete_chat_room(&target).await {
            Ok(_) => {
                println!("deleted {}", name);
                let was_active = self
                    .active_room
                    .as_ref()
                    .map(|room| room.id == target)
                    .unwrap_or(false);
                if was_active {
                    self.active_room = None;
                    self.session = ChatSession::new();
                    let first_room = self.rooms.iter_display().next().cloned();
                    match first_room {
                        Some(room) => self.open_room(room).await,
                        None => self.create_room().await,
                    }
                }
            }
            Err(e) => {
                self.rooms.restore(snapshot);
                println!(
                    "delete failed: {}. The room was put back.",
                    e.user_message()
                );
            }
        }
    }

    /// Optimistic rating: applied locally first, rolled back on failure
    async fn evaluate(&mut self, evaluation: Evaluation) {
        let room_id = match &self.active_room {
            Some(room) => room.id.clone(),
            None => {
                println!("no room open.");
                return;
            }
        };

        // Ids live in storage, not in the stream; refetch to find the
        // last assistant message.
        let messages = match self.client.list_chat_messages(&room_id).await {
            Ok(messages) => messages,
            Err(e) => {
                println!("rating failed: {}", e.user_message());
                return;
            }
        };
        let message_id = messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .and_then(|m| m.id.clone());
        let message_id = match message_id {
            Some(id) => id,
            None => {
                println!("nothing to rate yet.");
                return;
            }
        };

        let previous = self
            .session
            .last_assistant()
            .map(|turn| turn.evaluation)
            .unwrap_or_default();
        self.session.set_last_evaluation(evaluation);

        match self.client.update_evaluation(&message_id, evaluation).await {
            Ok(_) => println!("rated {}.", evaluation.as_str()),
            Err(e) => {
                self.session.set_last_evaluation(previous);
                println!("rating failed: {}", e.user_message());
            }
        }
    }

    async fn set_prompt(&mut self, arg: PromptArg) {
        match arg {
            PromptArg::Show => {
                let prompt = self
                    .active_room
                    .as_ref()
                    .and_then(|room| room.custom_prompt.as_deref());
                match prompt {
                    Some(text) if self.prompt_active => println!("prompt (active): {}", text),
                    Some(text) => println!("prompt (off): {}", text),
                    None => println!("no custom prompt set."),
                }
            }
            PromptArg::Off => {
                self.prompt_active = false;
                println!("custom prompt deactivated.");
            }
            PromptArg::Set(text) => {
                let room_id = match &self.active_room {
                    Some(room) => room.id.clone(),
                    None => {
                        println!("no room open.");
                        return;
                    }
                };
                match self
                    .client
                    .update_chat_room(&room_id, None, Some(&text))
                    .await
                {
                    Ok(updated) => {
                        self.rooms.upsert(updated.clone());
                        self.active_room = Some(updated);
                        self.prompt_active = true;
                        println!("custom prompt set.");
                    }
                    Err(e) => println!("could not save the prompt: {}", e.user_message()),
                }
            }
        }
    }

    async fn whoami(&mut self) {
        match self.client.user_info().await {
            Ok(user) => {
                match user.name {
                    Some(name) => println!("{} <{}>", name, user.email),
                    None => println!("{}", user.email),
                }
                println!("role: {}", user.role.as_str());
            }
            Err(e) => println!("{}", e.user_message()),
        }
    }

    fn switch_model(&mut self, name: Option<String>) {
        match name {
            None => {
                if self.core.model_list.is_empty() {
                    println!("current model: {}", self.model);
                    return;
                }
                for model in &self.core.model_list {
                    let marker = if *model == self.model { "*" } else { " " };
                    println!("{} {}", marker, model);
                }
            }
            Some(name) => {
                if self.core.model_list.is_empty() || self.core.model_list.contains(&name) {
                    self.model = name;
                    println!("model set to {}", self.model);
                } else {
                    println!("unknown model: {}. /model lists the options.", name);
                }
            }
        }
    }

    fn select_indexes(&mut self, selection: IndexSelection) {
        let all = self.all_index_details();
        if all.is_empty() {
            println!("no search indexes are configured.");
            return;
        }
        match selection {
            IndexSelection::All => {
                self.selected_indexes = all;
                println!("searching every index.");
            }
            IndexSelection::Picks(numbers) => {
                let mut picked: Vec<IndexTypeDetail> = Vec::new();
                for n in numbers {
                    match all.get(n - 1) {
                        Some(detail) => {
                            if !picked.contains(detail) {
                                picked.push(detail.clone());
                            }
                        }
                        None => {
                            println!("no index {}", n);
                            return;
                        }
                    }
                }
                if picked.is_empty() {
                    println!("nothing selected.");
                    return;
                }
                self.selected_indexes = picked;
                self.print_indexes();
            }
        }
    }

    fn print_indexes(&self) {
        let all = self.all_index_details();
        if all.is_empty() {
            println!("no search indexes are configured.");
            return;
        }
        for (i, detail) in all.iter().enumerate() {
            let marker = if self
                .selected_indexes
                .iter()
                .any(|selected| selected.id == detail.id)
            {
                "*"
            } else {
                " "
            };
            println!("{} {:>2}. {}", marker, i + 1, detail.folder_name);
        }
    }

    fn print_rooms(&self) {
        if self.rooms.is_empty() {
            println!("no rooms yet. /new creates one.");
            return;
        }
        for (i, room) in self.rooms.iter_display().enumerate() {
            println!("{}", render::room_line(i + 1, room, self.is_current(room)));
        }
    }

    fn print_search(&self, query: &str) {
        let matching: Vec<String> = self
            .rooms
            .filter(query)
            .into_iter()
            .map(|room| room.id.clone())
            .collect();
        if matching.is_empty() {
            println!("no rooms match {}", query);
            return;
        }
        for (i, room) in self.rooms.iter_display().enumerate() {
            if matching.iter().any(|id| *id == room.id) {
                println!("{}", render::room_line(i + 1, room, self.is_current(room)));
            }
        }
    }

    fn print_history(&self) {
        if self.session.turns().is_empty() {
            println!("nothing here yet.");
            return;
        }
        for turn in self.session.turns() {
            for line in render::turn_lines(turn) {
                println!("{}", line);
            }
        }
    }

    fn is_current(&self, room: &ChatRoom) -> bool {
        self.active_room
            .as_ref()
            .map(|active| active.id == room.id)
            .unwrap_or(false)
    }

    fn room_by_number(&self, number: usize) -> Option<&ChatRoom> {
        self.rooms.iter_display().nth(number - 1)
    }

    fn all_index_details(&self) -> Vec<IndexTypeDetail> {
        self.core
            .index_options()
            .into_iter()
            .map(|(id, folder_name)| IndexTypeDetail { id, folder_name })
            .collect()
    }
}
