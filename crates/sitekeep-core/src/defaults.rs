//! Seed data written to empty collections on first start.

use crate::models::{
    Category, Comment, CommentStatus, PortfolioItem, PricingPlan, ProcessStep, Service,
    SiteContent,
};

fn service(id: i64, title: &str, description: &str, icon: &str, color: &str, bg: &str) -> Service {
    Service {
        id,
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        image_url: None,
        color_class: Some(color.to_string()),
        bg_class: Some(bg.to_string()),
    }
}

pub fn services() -> Vec<Service> {
    vec![
        service(
            1,
            "3D Animation",
            "High-quality 3D modeling and animation for products, characters, and architectural visualization.",
            "fas fa-cube",
            "text-primary",
            "bg-blue-100 dark:bg-slate-700",
        ),
        service(
            2,
            "2D Animation",
            "Engaging 2D explainer videos, character animations, and motion comics to tell your story.",
            "fas fa-pencil-alt",
            "text-secondary",
            "bg-pink-100 dark:bg-slate-700",
        ),
        service(
            3,
            "Motion Graphics",
            "Dynamic motion graphics for logos, intro sequences, and promotional videos.",
            "fas fa-film",
            "text-purple-600",
            "bg-purple-100 dark:bg-slate-700",
        ),
        service(
            4,
            "Video Editing",
            "Professional video editing, color grading, and post-production services.",
            "fas fa-video",
            "text-primary",
            "bg-green-100 dark:bg-slate-700",
        ),
        service(
            5,
            "Concept Art",
            "Creative concept art and character design to visualize your ideas before production.",
            "fas fa-paint-brush",
            "text-orange-600",
            "bg-orange-100 dark:bg-slate-700",
        ),
        service(
            6,
            "VR / AR Content",
            "Immersive Virtual and Augmented Reality experiences for modern platforms.",
            "fas fa-vr-cardboard",
            "text-blue-600",
            "bg-blue-100 dark:bg-slate-700",
        ),
    ]
}

fn project(id: i64, title: &str, category: &str, photo: &str) -> PortfolioItem {
    PortfolioItem {
        id,
        title: title.to_string(),
        category: category.to_string(),
        url: format!(
            "https://images.unsplash.com/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
            photo
        ),
        cover_url: None,
        is_video: false,
        gallery: Vec::new(),
    }
}

pub fn portfolio() -> Vec<PortfolioItem> {
    vec![
        project(1, "Neon City 3D", "3d", "photo-1618005182384-a83a8bd57fbe"),
        project(2, "Character Design", "char", "photo-1635322966219-b75ed3a90533"),
        project(3, "Tech Intro", "motion", "photo-1550745165-9bc0b252726f"),
        project(4, "Product Viz", "3d", "photo-1605810230434-7631ac76ec81"),
        project(5, "Explainer Video", "2d", "photo-1558655146-d09347e92766"),
        project(6, "Abstract Art", "3d", "photo-1620641788421-7a1c342ea42e"),
    ]
}

fn testimonial(id: i64, user: &str, text: &str) -> Comment {
    Comment {
        id,
        user: user.to_string(),
        text: text.to_string(),
        rating: 5,
        status: CommentStatus::Approved,
    }
}

pub fn comments() -> Vec<Comment> {
    vec![
        testimonial(
            1,
            "John Smith",
            "The team at DEWABARS exceeded our expectations. The 3D architectural walkthrough was simply stunning.",
        ),
        testimonial(
            2,
            "Sarah Jones",
            "Highly professional and creative. They took our vague idea and turned it into a captivating explainer video.",
        ),
        testimonial(
            3,
            "Michael Brown",
            "Fast turnaround time and excellent communication. The character design for our game was spot on.",
        ),
    ]
}

fn plan(id: i64, name: &str, price: &str, unit: &str, features: &[&str], is_popular: bool) -> PricingPlan {
    PricingPlan {
        id,
        name: name.to_string(),
        price: price.to_string(),
        unit: unit.to_string(),
        features: features.iter().map(|f| f.to_string()).collect(),
        is_popular,
    }
}

pub fn pricing() -> Vec<PricingPlan> {
    vec![
        plan(
            1,
            "Starter",
            "$499",
            "/ project",
            &[
                "Up to 30 Seconds",
                "1080p HD Resolution",
                "Standard Assets",
                "Royalty-Free Music",
                "2 Revisions",
            ],
            false,
        ),
        plan(
            2,
            "Professional",
            "$999",
            "/ project",
            &[
                "Up to 90 Seconds",
                "4K Ultra HD",
                "Custom Characters",
                "Professional Voiceover",
                "Unlimited Revisions",
            ],
            true,
        ),
        plan(
            3,
            "Enterprise",
            "Custom",
            "",
            &[
                "Full Series Production",
                "Dedicated Art Director",
                "Cinematic Quality",
                "Source Files Included",
                "Priority Support",
            ],
            false,
        ),
    ]
}

fn step(id: i64, phase: &str, title: &str, description: &str, photo: &str) -> ProcessStep {
    ProcessStep {
        id,
        step: id,
        phase: phase.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        image_url: format!(
            "https://images.unsplash.com/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=600&q=80",
            photo
        ),
    }
}

pub fn process() -> Vec<ProcessStep> {
    vec![
        step(
            1,
            "Discovery",
            "Consultation",
            "We discuss your vision, goals, and requirements to understand exactly what you need.",
            "photo-1531482615713-2afd69097998",
        ),
        step(
            2,
            "Strategy",
            "Script & Storyboard",
            "Our creative team develops a unique concept and compelling script for your animation.",
            "photo-1626785774573-4b79931bfd54",
        ),
        step(
            3,
            "Creation",
            "Production",
            "This is where the magic happens. We bring the characters and scenes to life through animation.",
            "photo-1550751827-4bd374c3f58b",
        ),
        step(
            4,
            "Launch",
            "Final Delivery",
            "We deliver the final polished animation in your preferred format, ready to share with the world.",
            "photo-1620641788421-7a1c342ea42e",
        ),
    ]
}

pub fn content() -> SiteContent {
    SiteContent {
        home_hero_title: "High-Impact Animation Services".to_string(),
        home_hero_subtitle: "We create stunning 3D/2D animations, motion graphics, and VFX that bring your vision to life.".to_string(),
        home_hero_image: "https://images.unsplash.com/photo-1626544827763-d516dce335ca?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80".to_string(),
        home_stats_count: "250+".to_string(),
        about_title: "Creativity Meets Technology".to_string(),
        about_text: "Founded in 2024, DEWABARS ANIMATIONS started with a simple mission: to bring imagination to life through stunning visuals. Our studio specializes in blending artistic vision with cutting-edge technology.".to_string(),
        stat1_num: "250+".to_string(),
        stat1_label: "Projects Done".to_string(),
        stat2_num: "50+".to_string(),
        stat2_label: "Happy Clients".to_string(),
        stat3_num: "5+".to_string(),
        stat3_label: "Years Exp.".to_string(),
        stat4_num: "10+".to_string(),
        stat4_label: "Awards".to_string(),
        contact_phone: "077 567 4912".to_string(),
        contact_email: "oryxranking@gmail.com".to_string(),
        contact_address: "Dewabars Animation Studio, Sri Lanka".to_string(),
    }
}

pub fn categories() -> Vec<Category> {
    [
        ("3d", "3D Animation"),
        ("2d", "2D Animation"),
        ("vfx", "VFX"),
        ("motion", "Motion Graphics"),
        ("char", "Character Design"),
    ]
    .iter()
    .map(|(value, label)| Category {
        value: value.to_string(),
        label: label.to_string(),
    })
    .collect()
}
