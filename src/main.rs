use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use gram_sync::config::Config;
use gram_sync::directory::{
  BusinessCategory, CommunityPost, Gender, Principal, Registration, ResourceCategory, ResourceType,
};
use gram_sync::views::filters::{self, EntrepreneurFilter, Filter, PostFilter, ResourceFilter, StoryFilter};
use gram_sync::views::{display, summarize};
use gram_sync::{DirectoryClient, HttpGateway, MutationCoordinator, QueryCache};

#[derive(Parser, Debug)]
#[command(name = "gram")]
#[command(about = "Browse the village entrepreneur directory from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/gram/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Gateway base URL, overriding the config file
  #[arg(short, long)]
  url: Option<String>,

  /// Registrations each region aims for, overriding the config file
  #[arg(short, long)]
  target: Option<NonZeroU32>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Regional progress towards the registration target
  Dashboard,
  /// List entrepreneurs
  Directory {
    /// Case-insensitive text matched against name, village, panchayat and district
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    category: Option<BusinessCategory>,
  },
  /// Show one entrepreneur's profile
  Profile { id: String },
  /// Success stories, newest first
  Stories {
    #[arg(long)]
    category: Option<BusinessCategory>,
    #[arg(long)]
    village: Option<String>,
  },
  /// Community board, newest first
  Posts {
    #[arg(long)]
    category: Option<BusinessCategory>,
    #[arg(long)]
    panchayat: Option<String>,
  },
  /// Training resources
  Resources {
    #[arg(long)]
    category: Option<ResourceCategory>,
    #[arg(long = "type")]
    resource_type: Option<ResourceType>,
  },
  /// Register a new entrepreneur
  Register {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: u32,
    #[arg(long)]
    gender: Gender,
    /// Phone number or email
    #[arg(long)]
    contact: String,
    #[arg(long)]
    village: String,
    #[arg(long)]
    panchayat: String,
    #[arg(long)]
    district: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    category: BusinessCategory,
    /// Repeat for each skill
    #[arg(long = "skill", required = true)]
    skills: Vec<String>,
    #[arg(long)]
    bio: String,
  },
  /// Publish a message on the community board
  Post {
    /// Principal of the author
    #[arg(long)]
    author: String,
    #[arg(long)]
    village: String,
    #[arg(long)]
    panchayat: String,
    #[arg(long)]
    category: BusinessCategory,
    message: String,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let mut config = Config::load(args.config.as_deref())?;

  // Override gateway and target if specified on command line
  if let Some(url) = args.url {
    config.gateway.url = url;
  }
  if let Some(target) = args.target {
    config.dashboard.target = target;
  }

  let _log_guard = gram_sync::logging::init(&config.log)?;
  tracing::info!(url = %config.gateway.url, "starting");

  let gateway = HttpGateway::new(&config.gateway)?;
  let client = DirectoryClient::connected(QueryCache::new(), Arc::new(gateway));

  run(args.command, &client, &config).await
}

async fn run(command: Command, client: &DirectoryClient, config: &Config) -> Result<()> {
  match command {
    Command::Dashboard => {
      let entrepreneurs = client.list_entrepreneurs().await?;
      let summary = summarize(&entrepreneurs, config.dashboard.target);

      println!(
        "{} entrepreneurs in {} regions across {} states (target {} per region)\n",
        summary.total_entrepreneurs,
        summary.total_regions,
        summary.total_states,
        config.dashboard.target
      );
      for group in &summary.regions {
        println!(
          "{}, {}, {}: {} ({:.1}%)",
          group.key.panchayat, group.key.district, group.key.state, group.total, group.progress
        );
        let breakdown: Vec<String> = group
          .categories
          .iter()
          .filter(|(_, count)| *count > 0)
          .map(|(category, count)| format!("{} {} {}", category.icon(), category.short_label(), count))
          .collect();
        println!("    {}", breakdown.join("  "));
      }
    }

    Command::Directory {
      search,
      state,
      district,
      category,
    } => {
      let entrepreneurs = client.list_entrepreneurs().await?;
      let filter = EntrepreneurFilter {
        search,
        state,
        district,
        category,
      };

      let matched = filter.apply(&entrepreneurs);
      println!("{} of {} entrepreneurs", matched.len(), entrepreneurs.len());
      println!("states: {}", filters::states(&entrepreneurs).join(", "));
      println!(
        "districts: {}\n",
        filters::districts(&entrepreneurs, filter.state.as_deref()).join(", ")
      );
      for e in matched {
        println!(
          "{}  {} ({}), {}, {}  [{}]",
          e.id,
          e.full_name,
          e.age,
          e.village,
          e.district,
          e.business_category.label()
        );
      }
    }

    Command::Profile { id } => {
      let e = client.get_entrepreneur(&Principal::new(id)).await?;
      println!("{}", e.full_name);
      println!("  {} {}, {}", e.gender.label(), e.age, e.contact_info);
      println!("  {}, {}, {}, {}", e.village, e.panchayat, e.district, e.state);
      println!("  {} {}", e.business_category.icon(), e.business_category.label());
      if !e.skills.is_empty() {
        println!("  skills: {}", e.skills.join(", "));
      }
      println!("\n{}", e.bio);
    }

    Command::Stories { category, village } => {
      let stories = client.list_success_stories().await?;
      let filter = StoryFilter { category, village };
      println!("villages: {}\n", filters::story_villages(&stories).join(", "));
      for story in filter.apply(&stories) {
        println!(
          "{}  {} by {}, {} [{}]",
          display::story_date(story.date),
          story.title,
          story.author_name,
          story.village,
          story.category.label()
        );
        println!("    {}", story.content);
      }
    }

    Command::Posts {
      category,
      panchayat,
    } => {
      let posts = client.list_community_posts().await?;
      let filter = PostFilter {
        category,
        panchayat,
      };
      println!("panchayats: {}\n", filters::post_panchayats(&posts).join(", "));
      for post in filter.apply(&posts) {
        println!(
          "{}  {} ({}, {}) [{}]",
          display::post_time(post.timestamp),
          post.author,
          post.village,
          post.panchayat,
          post.category.short_label()
        );
        println!("    {}", post.message);
      }
    }

    Command::Resources {
      category,
      resource_type,
    } => {
      let resources = client.list_training_resources().await?;
      let filter = ResourceFilter {
        category,
        resource_type,
      };
      for resource in filter.apply(&resources) {
        println!(
          "[{}] {} ({})",
          resource.resource_type.label(),
          resource.title,
          resource.category.label()
        );
        println!("    {}", resource.url);
      }
    }

    Command::Register {
      name,
      age,
      gender,
      contact,
      village,
      panchayat,
      district,
      state,
      category,
      skills,
      bio,
    } => {
      let entrepreneur = Registration {
        full_name: name,
        age,
        gender,
        contact_info: contact,
        village,
        panchayat,
        district,
        state,
        business_category: category,
        skills,
        bio,
      }
      .into_entrepreneur()?;
      let full_name = entrepreneur.full_name.clone();

      MutationCoordinator::new(client.clone())
        .register_entrepreneur(entrepreneur)
        .await?;

      let entrepreneurs = client.list_entrepreneurs().await?;
      println!(
        "Registered {}. The directory now lists {} entrepreneurs.",
        full_name,
        entrepreneurs.len()
      );
    }

    Command::Post {
      author,
      village,
      panchayat,
      category,
      message,
    } => {
      if message.trim().is_empty() {
        return Err(eyre!("Message must not be empty"));
      }

      let timestamp = chrono::Utc::now()
        .timestamp_nanos_opt()
        .ok_or_else(|| eyre!("System clock is out of range"))?;
      let post = CommunityPost {
        id: 0,
        author: Principal::new(author),
        village,
        panchayat,
        message,
        category,
        timestamp,
      };

      MutationCoordinator::new(client.clone())
        .add_community_post(post)
        .await?;

      let posts = client.list_community_posts().await?;
      println!("Posted. The board now has {} messages.", posts.len());
    }
  }

  Ok(())
}
