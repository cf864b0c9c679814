//! The interactive menu dispatcher.
//!
//! Single-character commands drive the engine; the currently open tree
//! (if any) is owned here. Non-fatal conditions — no file open, an
//! unknown option — print a notice and return to the menu. Engine errors
//! propagate to the binary, which prints one line and exits non-zero.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::input;
use crate::error::Result;
use crate::tree::BPlusTree;

const MENU: &str = "\n[1] Create new index file.\n\
                    [2] Open existing index file.\n\
                    [3] Close current index file.\n\
                    [4] Insert a value into current index file.\n\
                    [5] Search for a value in current index file.\n\
                    [0] Quit program.\n";
const PROMPT: &str = "Your choice: ";

/// Menu dispatcher owning the line editor and the open tree, if any.
pub struct Menu {
    editor: DefaultEditor,
    tree: Option<BPlusTree>,
    file_name: Option<String>,
}

impl Menu {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(input::readline_error)?;
        Ok(Self {
            editor,
            tree: None,
            file_name: None,
        })
    }

    /// Runs the menu loop until quit or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            println!("{MENU}");
            let line = match self.editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(input::readline_error(err)),
            };
            match line.trim().chars().next() {
                Some('1') => self.create()?,
                Some('2') => self.open()?,
                Some('3') => self.close()?,
                Some('4') => self.insert()?,
                Some('5') => self.search()?,
                Some('0') => break,
                _ => eprintln!("Invalid option, try again."),
            }
        }
        self.close()
    }

    fn create(&mut self) -> Result<()> {
        self.close()?;
        let Some(name) = input::read_file_name(&mut self.editor)? else {
            return Ok(());
        };
        self.tree = Some(BPlusTree::create(&name)?);
        eprintln!("File {name} has been created.");
        self.file_name = Some(name);
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        self.close()?;
        let Some(name) = input::read_file_name(&mut self.editor)? else {
            return Ok(());
        };
        self.tree = Some(BPlusTree::open(&name)?);
        eprintln!("File {name} has been opened.");
        self.file_name = Some(name);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(tree) = self.tree.take() {
            tree.close()?;
            if let Some(name) = self.file_name.take() {
                eprintln!("File {name} has been closed.");
            }
        }
        Ok(())
    }

    fn insert(&mut self) -> Result<()> {
        let Some(tree) = self.tree.as_mut() else {
            eprintln!("You must open/create a file first.");
            return Ok(());
        };
        let Some(value) = input::read_key(&mut self.editor)? else {
            return Ok(());
        };
        tree.insert(value)
    }

    fn search(&mut self) -> Result<()> {
        let Some(tree) = self.tree.as_mut() else {
            eprintln!("You must open/create a file first.");
            return Ok(());
        };
        let Some(value) = input::read_key(&mut self.editor)? else {
            return Ok(());
        };
        if tree.lookup(value)? {
            println!("Value {value} is stored in the index.");
        } else {
            println!("Value {value} is not in the index.");
        }
        Ok(())
    }
}
