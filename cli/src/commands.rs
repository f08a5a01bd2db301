//! Subcommands and their handlers.
//!
//! Handlers write to any `io::Write` so tests can capture output. A todo
//! command builds its own `TodoSync`, which starts empty and fills from the
//! server, so every listing shows the server's current state.

use std::io::Write;

use anyhow::Result;
use clap::{Args, Subcommand};
use todo_social_core::{Backend, KeyValueStore, Refresh, TodoItem, TodoSync, Transport};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account.
    Register(RegisterArgs),
    /// Log in and store the session.
    Login(LoginArgs),
    /// Forget the stored session.
    Logout,
    /// Show the locally stored username.
    Whoami,
    /// Fetch the profile from the server.
    Profile,
    /// List, add or remove todos.
    #[command(subcommand)]
    Todos(TodosCommand),
    /// Publish a post.
    Post {
        /// Post text.
        content: String,
    },
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    pub username: String,
    #[arg(long, env = "TODO_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum TodosCommand {
    /// Show all todos.
    List,
    /// Create a todo. Both fields are required.
    Add { title: String, description: String },
    /// Delete a todo by id.
    Rm { id: String },
}

pub fn run<T: Transport, S: KeyValueStore>(
    command: Command,
    backend: &Backend<T, S>,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Register(args) => {
            backend.register(&args.username, &args.password, &args.email)?;
            writeln!(out, "registered {}", args.username)?;
        }
        Command::Login(args) => {
            backend.login(&args.username, &args.password)?;
            writeln!(out, "Login successful!")?;
        }
        Command::Logout => {
            backend.logout()?;
            writeln!(out, "logged out")?;
        }
        Command::Whoami => match backend.sessions().get()? {
            Some(session) if !session.username.is_empty() => writeln!(out, "{}", session.username)?,
            Some(_) => writeln!(out, "logged in")?,
            None => writeln!(out, "not logged in")?,
        },
        Command::Profile => {
            let profile = backend.profile()?;
            writeln!(out, "Username: {}", profile.username)?;
            writeln!(out, "Email: {}", profile.email)?;
        }
        Command::Todos(cmd) => run_todos(cmd, backend, out)?,
        Command::Post { content } => {
            let post = backend.create_post(&content)?;
            writeln!(out, "posted {}", post.id)?;
        }
    }
    Ok(())
}

fn run_todos<T: Transport, S: KeyValueStore>(
    command: TodosCommand,
    backend: &Backend<T, S>,
    out: &mut impl Write,
) -> Result<()> {
    let mut sync = TodoSync::new(backend);
    let (done, refresh) = match command {
        TodosCommand::List => {
            sync.list()?;
            ("listed", Refresh::Fresh)
        }
        TodosCommand::Add { title, description } => ("added", sync.create(&title, &description)?),
        TodosCommand::Rm { id } => ("deleted", sync.delete(&id)?),
    };
    match refresh {
        Refresh::Fresh => print_todos(sync.todos(), out),
        Refresh::Stale(err) => {
            writeln!(out, "{done}, but the list could not be refreshed: {}", err.user_message())?;
            Ok(())
        }
    }
}

fn print_todos(todos: &[TodoItem], out: &mut impl Write) -> Result<()> {
    if todos.is_empty() {
        writeln!(out, "no todos")?;
    }
    for todo in todos {
        writeln!(
            out,
            "{}  {}  {}: {}",
            todo.id,
            todo.created_date(),
            todo.title,
            todo.description
        )?;
    }
    Ok(())
}
