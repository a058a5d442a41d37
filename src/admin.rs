use anyhow::{anyhow, bail, Context, Result};
use clap::Subcommand;
use interview_portal::assessment::DifficultyFilter;
use interview_portal::category::{self, CategoryId};
use interview_portal::question::QuestionId;
use interview_portal::results::{ResultDetail, ScoreBand};
use interview_portal::time::format_elapsed;
use interview_portal::tree::duplicate_names;
use interview_portal::{
    candidate_link, ApiClient, Category, CategoryForm, CategoryTree, Difficulty, Question,
    QuestionFilter, QuestionForm, TestBuilder,
};
use tracing::warn;
use url::Url;

#[derive(Subcommand)]
pub enum CategoryCommand {
    List {
        #[clap(long)]
        search: Option<String>,
        /// Print roots with their assignable categories instead of a flat list.
        #[clap(long)]
        tree: bool,
    },
    Create {
        name: String,
        #[clap(long, default_value = "")]
        description: String,
        /// Parent category name; omit for a main category.
        #[clap(long)]
        parent: Option<String>,
    },
    Update {
        id: CategoryId,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        description: Option<String>,
        /// Parent category name, or "none" to make it a main category.
        #[clap(long)]
        parent: Option<String>,
    },
    Delete {
        id: CategoryId,
    },
}

#[derive(clap::Args)]
pub struct QuestionArgs {
    /// Main category name.
    #[clap(long)]
    category: Option<String>,
    /// Subcategory name under the main category.
    #[clap(long)]
    subcategory: Option<String>,
    #[clap(long, value_parser)]
    difficulty: Option<Difficulty>,
    #[clap(long)]
    text: Option<String>,
    #[clap(long = "a")]
    option_a: Option<String>,
    #[clap(long = "b")]
    option_b: Option<String>,
    #[clap(long = "c")]
    option_c: Option<String>,
    #[clap(long = "d")]
    option_d: Option<String>,
    #[clap(long)]
    correct: Option<String>,
}

#[derive(Subcommand)]
pub enum QuestionCommand {
    List {
        #[clap(long, default_value = "1")]
        page: u32,
        #[clap(long, default_value = "10")]
        per_page: u32,
        /// Main category name.
        #[clap(long)]
        category: Option<String>,
        /// Subcategory name under the main category.
        #[clap(long)]
        subcategory: Option<String>,
        #[clap(long, value_parser)]
        difficulty: Option<Difficulty>,
        #[clap(long)]
        search: Option<String>,
    },
    Create(QuestionArgs),
    /// Edit a question; fields not given keep their current value.
    Update {
        id: QuestionId,
        #[clap(flatten)]
        args: QuestionArgs,
    },
    Delete {
        id: QuestionId,
    },
}

#[derive(Subcommand)]
pub enum TestCommand {
    List,
    /// Show the question bank grouped by category, as picked from when building a test.
    Browse {
        /// Limit a main category to one difficulty, as `ROOT=Hard`.
        #[clap(long = "filter", value_name = "ROOT=DIFFICULTY")]
        filters: Vec<String>,
    },
    Create {
        #[clap(long)]
        name: String,
        #[clap(long = "question", required = true)]
        questions: Vec<QuestionId>,
    },
    Delete {
        id: i64,
    },
    /// Print the link to send to candidates.
    Link {
        test_code: String,
        #[clap(long, env = "PORTAL_ORIGIN", value_parser)]
        origin: Url,
    },
}

#[derive(Subcommand)]
pub enum ResultCommand {
    List,
    Show { id: i64 },
    /// Raw candidate rows, optionally for one test.
    Candidates {
        #[clap(long)]
        test_id: Option<i64>,
    },
    Delete { id: i64 },
}

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<()> {
    client
        .login(email, password)
        .await
        .context("failed to sign in")?;

    let token = client
        .auth()
        .export_token()
        .ok_or_else(|| anyhow!("backend returned no token"))?;
    println!("export PORTAL_API_TOKEN={token}");

    Ok(())
}

pub async fn categories(client: &ApiClient, command: CategoryCommand) -> Result<()> {
    match command {
        CategoryCommand::List { search, tree } => {
            let categories = client.list_categories().await?;

            for name in duplicate_names(&categories) {
                warn!(%name, "category name is used more than once");
            }

            if tree {
                print_tree(&CategoryTree::new(&categories));
            } else {
                for category in category::search(&categories, search.as_deref().unwrap_or("")) {
                    print_category(category);
                }
            }
        }
        CategoryCommand::Create {
            name,
            description,
            parent,
        } => {
            let payload = CategoryForm {
                name,
                description,
                parent,
            }
            .into_payload()?;
            let categories = client.list_categories().await?;

            if CategoryTree::new(&categories)
                .find_by_name(&payload.name)
                .is_some()
            {
                bail!("a category named {:?} already exists", payload.name);
            }

            client.create_category(&payload).await?;
            println!("Category created successfully!");
        }
        CategoryCommand::Update {
            id,
            name,
            description,
            parent,
        } => {
            let categories = client.list_categories().await?;
            let current = CategoryTree::new(&categories)
                .find_by_id(id)
                .ok_or_else(|| anyhow!("category {id} not found"))?;
            let payload = CategoryForm {
                name: name.unwrap_or_else(|| current.name.clone()),
                description: description
                    .or_else(|| current.description.clone())
                    .unwrap_or_default(),
                parent: parent.or_else(|| current.parent_name().map(ToOwned::to_owned)),
            }
            .into_payload()?;

            if categories
                .iter()
                .any(|category| category.id != id && category.name == payload.name)
            {
                bail!("a category named {:?} already exists", payload.name);
            }

            client.update_category(id, &payload).await?;
            println!("Category updated successfully!");
        }
        CategoryCommand::Delete { id } => {
            client
                .delete_category(id)
                .await
                .context("failed to delete category")?;
            println!("Category deleted successfully!");
        }
    }

    Ok(())
}

pub async fn questions(client: &ApiClient, command: QuestionCommand) -> Result<()> {
    match command {
        QuestionCommand::List {
            page,
            per_page,
            category,
            subcategory,
            difficulty,
            search,
        } => {
            let categories = client.list_categories().await?;
            let tree = CategoryTree::new(&categories);
            let filter = QuestionFilter {
                page,
                per_page,
                difficulty,
                search,
                ..QuestionFilter::default()
            }
            .scoped(&tree, category.as_deref(), subcategory.as_deref())?;
            let result = client.list_questions(&filter).await?;

            for question in &result.items {
                print_question(question);
            }
            println!(
                "page {page} of {} ({} questions)",
                result.total_pages(per_page),
                result.total
            );
        }
        QuestionCommand::Create(args) => {
            let categories = client.list_categories().await?;
            let tree = CategoryTree::validated(&categories)?;
            let payload = args.apply(QuestionForm::default(), &tree)?.into_payload(&tree)?;

            client.create_question(&payload).await?;
            println!("Question created.");
        }
        QuestionCommand::Update { id, args } => {
            let categories = client.list_categories().await?;
            let tree = CategoryTree::validated(&categories)?;
            let bank = client.all_questions().await?;
            let question = bank
                .iter()
                .find(|question| question.id == id)
                .ok_or_else(|| anyhow!("question {id} not found"))?;

            let form = QuestionForm::from_question(question, &tree);
            let payload = args.apply(form, &tree)?.into_payload(&tree)?;

            client.update_question(id, &payload).await?;
            println!("Question updated.");
        }
        QuestionCommand::Delete { id } => {
            client.delete_question(id).await?;
            println!("Question deleted.");
        }
    }

    Ok(())
}

impl QuestionArgs {
    fn apply(self, mut form: QuestionForm, tree: &CategoryTree<'_>) -> Result<QuestionForm> {
        if let Some(category) = self.category {
            form.root = category;
            form.subcategory_id = None;
        }
        if let Some(subcategory) = self.subcategory {
            let child = tree
                .children_of(&form.root)
                .into_iter()
                .find(|category| category.name == subcategory)
                .ok_or_else(|| {
                    anyhow!("{subcategory:?} is not a subcategory of {:?}", form.root)
                })?;
            form.subcategory_id = Some(child.id);
        }
        if let Some(difficulty) = self.difficulty {
            form.difficulty = difficulty;
        }
        if let Some(text) = self.text {
            form.question_text = text;
        }
        for (slot, value) in form
            .options
            .iter_mut()
            .zip([self.option_a, self.option_b, self.option_c, self.option_d])
        {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(correct) = self.correct {
            form.correct_option = correct.to_lowercase();
        }

        Ok(form)
    }
}

pub async fn tests(client: &ApiClient, command: TestCommand) -> Result<()> {
    match command {
        TestCommand::List => {
            for test in client.list_tests().await? {
                println!(
                    "{:>5}  {:<10}  {:<30}  {:>3} questions  {:>3} candidates",
                    test.id,
                    test.test_code,
                    test.display_name(),
                    test.questions_data.len(),
                    test.candidate_count.unwrap_or(0)
                );
            }
        }
        TestCommand::Browse { filters } => {
            let categories = client.list_categories().await?;
            let tree = CategoryTree::new(&categories);
            let bank = client.all_questions().await?;
            let mut builder = TestBuilder::new();

            for filter in filters {
                let (root, difficulty) = filter
                    .split_once('=')
                    .ok_or_else(|| anyhow!("expected ROOT=DIFFICULTY, got {filter:?}"))?;
                builder.set_filter(root, DifficultyFilter::Only(difficulty.parse()?));
            }

            let grouped = tree.group_questions(&bank);
            for group in grouped.groups.iter().filter(|group| group.total > 0) {
                println!("{} ({} questions)", group.root, group.total);
                for question in builder.visible(group) {
                    print!("  ");
                    print_question(question);
                }
            }

            if !grouped.orphans.is_empty() {
                warn!(
                    count = grouped.orphans.len(),
                    "questions reference categories that no longer exist"
                );
                println!("(no category)");
                for question in &grouped.orphans {
                    print!("  ");
                    print_question(question);
                }
            }
        }
        TestCommand::Create { name, questions } => {
            ensure_creator(client)?;

            let bank = client.all_questions().await?;
            let mut builder = TestBuilder::new();

            for id in questions {
                let question = bank
                    .iter()
                    .find(|question| question.id == id)
                    .ok_or_else(|| anyhow!("question {id} not found"))?;

                if !builder.is_selected(id) {
                    builder.toggle(question);
                }
            }

            let test = builder.build(&name)?;
            client
                .create_test(&test)
                .await
                .context("failed to create test")?;
            println!("Test {:?} created with {} questions.", test.test_name, test.questions.len());
        }
        TestCommand::Delete { id } => {
            ensure_creator(client)?;
            client.delete_test(id).await.context("failed to delete test")?;
            println!("Test deleted.");
        }
        TestCommand::Link { test_code, origin } => {
            println!("{}", candidate_link(&origin, &test_code)?);
        }
    }

    Ok(())
}

pub async fn results(client: &ApiClient, command: ResultCommand) -> Result<()> {
    match command {
        ResultCommand::List => {
            for result in client.list_results().await? {
                println!(
                    "{:>5}  {:<24}  {:<30}  {:<10}  {:>6}  {:>6.1}%  {}",
                    result.id,
                    result.name,
                    result.email,
                    result.test_code,
                    result.score,
                    result.score_percentage,
                    result.time_taken_formatted
                );
            }
        }
        ResultCommand::Show { id } => {
            let detail = client.result_detail(id).await?;
            print_result(&detail);
        }
        ResultCommand::Candidates { test_id } => {
            for candidate in client.list_candidates(test_id).await? {
                println!("{candidate}");
            }
        }
        ResultCommand::Delete { id } => {
            client
                .delete_result(id)
                .await
                .context("failed to delete result")?;
            println!("Result deleted.");
        }
    }

    Ok(())
}

fn ensure_creator(client: &ApiClient) -> Result<()> {
    match client.auth().role() {
        Some(role) if !client.auth().is_creator() => {
            bail!("role {role:?} cannot manage tests")
        }
        _ => Ok(()),
    }
}

fn print_category(category: &Category) {
    println!(
        "{:>5}  {:<30}  {:<20}  {}",
        category.id,
        category.name,
        category.parent_name().unwrap_or("-"),
        category.description.as_deref().unwrap_or("")
    );
}

fn print_tree(tree: &CategoryTree<'_>) {
    for root in tree.derived_roots() {
        let marker = if tree.root_row(&root).is_some() { "" } else { " (no row)" };
        println!("{root}{marker}");

        for child in tree.children_of(&root) {
            if !child.is_root() {
                println!("  {:>5}  {}", child.id, child.name);
            }
        }
    }
}

fn print_question(question: &Question) {
    println!(
        "{:>5}  [{}]  {:<20}  {}",
        question.id, question.difficulty, question.category_name, question.question_text
    );
}

fn print_result(detail: &ResultDetail) {
    let candidate = &detail.candidate;

    println!("{} <{}>", candidate.name, candidate.email);
    println!(
        "{} ({})  score {:.1}% {}  correct {}/{}  time {}",
        candidate.test_name.as_deref().unwrap_or(&candidate.test_code),
        candidate.test_code,
        candidate.score,
        ScoreBand::from_score(candidate.score),
        candidate.correct_answers,
        candidate.total_questions,
        format_elapsed(candidate.time_taken)
    );

    for (category_name, responses) in detail.responses_by_category() {
        println!();
        println!("{category_name}");

        for response in responses {
            let verdict = if response.is_correct { "correct" } else { "wrong" };
            let selected = if response.selected_option.is_empty() {
                "-"
            } else {
                response.selected_option.as_str()
            };

            println!(
                "  [{verdict}] {}  (selected {selected}, answer {})",
                response.question_text, response.correct_option
            );
        }
    }
}
